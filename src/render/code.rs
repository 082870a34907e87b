//! Source files rendered as escaped `<pre><code>` blocks.
//!
//! The `language-*` class is what client-side highlighters key on.

use std::path::Path;

use crate::utils::html::escape;

/// Guess a highlighter language name from the file name.
pub fn language_for(path: &Path) -> &'static str {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    match name {
        "Makefile" | "makefile" | "GNUmakefile" => return "makefile",
        "Dockerfile" => return "dockerfile",
        "CMakeLists.txt" => return "cmake",
        _ => {}
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "rs" => "rust",
        "go" => "go",
        "py" | "pyi" => "python",
        "js" | "mjs" | "cjs" | "jsx" => "javascript",
        "ts" | "tsx" | "mts" | "cts" => "typescript",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" | "hh" => "cpp",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "swift" => "swift",
        "rb" => "ruby",
        "php" => "php",
        "cs" => "csharp",
        "sh" | "bash" | "zsh" => "bash",
        "ps1" => "powershell",
        "sql" => "sql",
        "html" | "htm" => "html",
        "css" => "css",
        "scss" => "scss",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "xml" | "svg" => "xml",
        "lua" => "lua",
        "zig" => "zig",
        "hs" => "haskell",
        "ex" | "exs" => "elixir",
        _ => "plaintext",
    }
}

/// Wrap source text in an escaped code block.
pub fn to_html(source: &str, language: &str) -> String {
    format!(
        "<pre><code class=\"language-{language}\">{}</code></pre>\n",
        escape(source)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_by_extension() {
        assert_eq!(language_for(Path::new("src/main.rs")), "rust");
        assert_eq!(language_for(Path::new("app.TSX")), "typescript");
        assert_eq!(language_for(Path::new("notes.txt")), "plaintext");
    }

    #[test]
    fn test_language_by_name() {
        assert_eq!(language_for(Path::new("/repo/Makefile")), "makefile");
        assert_eq!(language_for(Path::new("Dockerfile")), "dockerfile");
    }

    #[test]
    fn test_to_html_escapes() {
        let html = to_html("if a < b && c > d {}", "go");
        assert_eq!(
            html,
            "<pre><code class=\"language-go\">if a &lt; b &amp;&amp; c &gt; d {}</code></pre>\n"
        );
    }
}
