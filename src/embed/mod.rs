//! Embedded static resources.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Viewer page (index.html)
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{INDEX_HTML, ViewerVars};
//!
//! let html = INDEX_HTML.render(&ViewerVars { ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// Variables for index.html.
    pub struct ViewerVars {
        pub ws_port: u16,
    }

    impl TemplateVars for ViewerVars {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__LIVEMD_WS_PORT__", &self.ws_port.to_string())
                .replace("__LIVEMD_VERSION__", env!("CARGO_PKG_VERSION"))
        }
    }

    /// Viewer page: file list, rendered content, log panel.
    pub const INDEX_HTML: Template<ViewerVars> = Template::new(include_str!("serve/index.html"));
}

#[cfg(test)]
mod tests {
    use super::serve::{INDEX_HTML, ViewerVars};

    #[test]
    fn test_index_gets_ws_port() {
        let html = INDEX_HTML.render(&ViewerVars { ws_port: 41234 });
        assert!(html.contains("41234"));
        assert!(!html.contains("__LIVEMD_WS_PORT__"));
        assert!(!html.contains("__LIVEMD_VERSION__"));
    }
}
