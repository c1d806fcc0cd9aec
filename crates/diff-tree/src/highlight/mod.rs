//! Syntax highlighting for rendered diff segments.

mod highlighter;
mod language;

pub use highlighter::{SyntectHighlighter, DEFAULT_THEME};
pub use language::language_for_path;

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
