//! File to HTML rendering.
//!
//! The hub only sees the [`Render`] trait: a path goes in, HTML or a
//! [`RenderError`] comes out. [`FileRenderer`] is the default implementation:
//!
//! - markdown files go through pulldown-cmark ([`markdown`])
//! - any other text file is shown as escaped source code ([`code`])

pub mod code;
pub mod markdown;

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Rendering failures.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read `{}`", .0.display())]
    Read(PathBuf, #[source] std::io::Error),

    #[error("`{}` is not valid UTF-8 text", .0.display())]
    Unsupported(PathBuf),
}

/// Convert a file on disk to HTML.
///
/// Implementations are called concurrently from several watch callbacks
/// and must not rely on shared mutable state.
pub trait Render: Send + Sync {
    fn render(&self, path: &Path) -> Result<String, RenderError>;
}

/// Markdown or source-code renderer, chosen by file extension.
#[derive(Debug, Clone)]
pub struct FileRenderer {
    options: markdown::MarkdownOptions,
}

impl FileRenderer {
    pub fn new() -> Self {
        Self {
            options: markdown::MarkdownOptions::all(),
        }
    }

    /// Render already-loaded file content.
    pub fn render_source(&self, path: &Path, source: &str) -> String {
        if markdown::is_markdown(path) {
            markdown::to_html(source, &self.options)
        } else {
            code::to_html(source, code::language_for(path))
        }
    }
}

impl Default for FileRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Render for FileRenderer {
    fn render(&self, path: &Path) -> Result<String, RenderError> {
        let bytes = std::fs::read(path).map_err(|e| RenderError::Read(path.to_path_buf(), e))?;
        let source =
            String::from_utf8(bytes).map_err(|_| RenderError::Unsupported(path.to_path_buf()))?;
        Ok(self.render_source(path, &source))
    }
}
