//! Trait for turning a text segment into highlighted HTML.

use crate::highlight::escape_html;
use thiserror::Error;

/// Errors a highlighter may report. The renderer never propagates them; it
/// falls back to escaped plain text instead.
#[derive(Debug, Error)]
pub enum HighlightError {
    /// No grammar is known for the language hint.
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The grammar failed on this input.
    #[error("Highlighting failed: {0}")]
    Failed(String),
}

/// Highlights a text segment for a language hint.
///
/// The returned string must be HTML-safe.
///
/// # Example
///
/// ```ignore
/// struct Shouting;
///
/// impl SyntaxHighlighter for Shouting {
///     fn highlight(&self, text: &str, _language: &str) -> Result<String, HighlightError> {
///         Ok(escape_html(&text.to_uppercase()))
///     }
/// }
/// ```
pub trait SyntaxHighlighter: Send + Sync {
    fn highlight(&self, text: &str, language: &str) -> Result<String, HighlightError>;
}

/// Highlighter that only escapes. Used when highlighting is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextHighlighter;

impl SyntaxHighlighter for PlainTextHighlighter {
    fn highlight(&self, text: &str, _language: &str) -> Result<String, HighlightError> {
        Ok(escape_html(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_escapes() {
        let html = PlainTextHighlighter.highlight("a < b && c", "rust").unwrap();
        assert_eq!(html, "a &lt; b &amp;&amp; c");
    }

    #[test]
    fn test_error_messages() {
        let err = HighlightError::UnsupportedLanguage("cobol".to_string());
        assert_eq!(err.to_string(), "Unsupported language: cobol");
    }
}
