//! Markdown to HTML using pulldown-cmark.
//!
//! On top of the stock HTML writer:
//! - soft line breaks become `<br />` (what you type is what you see)
//! - headings without an explicit `{#id}` get a slugified, de-duplicated id

use std::path::Path;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use rustc_hash::FxHashMap;

use crate::utils::slug::slugify;

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd", "mkdn"];

/// Check whether a path should be rendered as markdown.
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|m| m.eq_ignore_ascii_case(ext))
        })
}

/// Options for markdown conversion
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptions {
    /// Enable tables extension
    pub tables: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Enable strikethrough extension
    pub strikethrough: bool,
    /// Enable task lists extension
    pub task_lists: bool,
    /// Enable heading attributes extension (e.g., `# Heading {#custom-id}`)
    pub heading_attributes: bool,
    /// Render soft line breaks as `<br />`
    pub hard_wraps: bool,
}

impl MarkdownOptions {
    /// GitHub-flavoured defaults
    pub fn all() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
            hard_wraps: true,
        }
    }

    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        opts
    }
}

/// Convert markdown source to an HTML fragment.
pub fn to_html(source: &str, options: &MarkdownOptions) -> String {
    let parser = Parser::new_ext(source, options.to_pulldown_options());

    let mut events: Vec<Event<'_>> = parser
        .map(|event| match event {
            Event::SoftBreak if options.hard_wraps => Event::HardBreak,
            other => other,
        })
        .collect();
    assign_heading_ids(&mut events);

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Give every heading without an explicit id one derived from its text.
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut seen: FxHashMap<String, usize> = FxHashMap::default();

    // Explicit ids claim their slot first so generated ones never collide.
    for event in events.iter() {
        if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
            seen.insert(id.to_string(), 0);
        }
    }

    for i in 0..events.len() {
        let Event::Start(Tag::Heading { id: None, .. }) = &events[i] else {
            continue;
        };

        let text = heading_text(&events[i + 1..]);
        let base = match slugify(&text) {
            s if s.is_empty() => "section".to_string(),
            s => s,
        };
        let slug = unique_slug(&mut seen, base);

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(slug));
        }
    }
}

/// Collect the plain text of a heading, up to its closing tag.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

fn unique_slug(seen: &mut FxHashMap<String, usize>, base: String) -> String {
    let Some(mut count) = seen.get(&base).copied() else {
        seen.insert(base.clone(), 0);
        return base;
    };
    let candidate = loop {
        count += 1;
        let candidate = format!("{base}-{count}");
        if !seen.contains_key(&candidate) {
            break candidate;
        }
    };
    seen.insert(candidate.clone(), 0);
    seen.insert(base, count);
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(src: &str) -> String {
        to_html(src, &MarkdownOptions::all())
    }

    #[test]
    fn test_is_markdown() {
        assert!(is_markdown(Path::new("README.md")));
        assert!(is_markdown(Path::new("guide.MARKDOWN")));
        assert!(!is_markdown(Path::new("main.rs")));
        assert!(!is_markdown(Path::new("Makefile")));
    }

    #[test]
    fn test_heading_ids() {
        let html = render("# Getting Started\n\n## Install `cargo`");
        assert!(html.contains(r#"<h1 id="getting-started">Getting Started</h1>"#));
        assert!(html.contains(r#"<h2 id="install-cargo">"#));
    }

    #[test]
    fn test_duplicate_heading_ids() {
        let html = render("# Usage\n\n# Usage\n\n# Usage");
        assert!(html.contains(r#"id="usage""#));
        assert!(html.contains(r#"id="usage-1""#));
        assert!(html.contains(r#"id="usage-2""#));
    }

    #[test]
    fn test_unique_slug_skips_taken_suffix() {
        let mut seen = FxHashMap::default();
        assert_eq!(unique_slug(&mut seen, "a".into()), "a");
        assert_eq!(unique_slug(&mut seen, "a-1".into()), "a-1");
        assert_eq!(unique_slug(&mut seen, "a".into()), "a-2");
        assert_eq!(unique_slug(&mut seen, "a".into()), "a-3");
    }

    #[test]
    fn test_explicit_heading_id_kept() {
        let html = render("# Intro {#start}\n\n# Start");
        assert!(html.contains(r#"id="start""#));
        assert!(html.contains(r#"id="start-1""#));
    }

    #[test]
    fn test_hard_wraps() {
        let html = render("line one\nline two");
        assert!(html.contains("line one<br />"));
    }

    #[test]
    fn test_gfm_extensions() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains(r#"type="checkbox""#));
    }

    #[test]
    fn test_raw_html_passthrough() {
        let html = render("<div class=\"note\">hi</div>");
        assert!(html.contains(r#"<div class="note">hi</div>"#));
    }

    #[test]
    fn test_fenced_code_language_class() {
        let html = render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"<code class="language-rust">"#));
    }
}
