//! Syntax highlighter using syntect.

use crate::traits::{HighlightError, SyntaxHighlighter};
use std::collections::HashMap;
use std::sync::Mutex;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::{SyntaxReference, SyntaxSet};

/// Theme used when none is configured or the configured one is unknown.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Highlights segments into inline-styled HTML spans.
pub struct SyntectHighlighter {
    /// Syntax definitions.
    syntax_set: SyntaxSet,
    /// Current theme.
    theme: Theme,
    /// Syntax index by language hint (avoids repeated lookups). `None`
    /// records a hint with no grammar.
    syntax_cache: Mutex<HashMap<String, Option<usize>>>,
}

impl std::fmt::Debug for SyntectHighlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntectHighlighter")
            .field("theme", &self.theme.name)
            .finish()
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntectHighlighter {
    /// Create a new highlighter with the default theme.
    pub fn new() -> Self {
        Self::with_theme_name(DEFAULT_THEME)
    }

    /// Create a highlighter with a specific theme name, falling back to
    /// [`DEFAULT_THEME`].
    pub fn with_theme_name(theme_name: &str) -> Self {
        let theme_set = ThemeSet::load_defaults();
        let theme = theme_set
            .themes
            .get(theme_name)
            .or_else(|| {
                log::warn!("Unknown theme '{}', using {}", theme_name, DEFAULT_THEME);
                theme_set.themes.get(DEFAULT_THEME)
            })
            .cloned()
            .unwrap_or_default();

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            syntax_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Look up the grammar for a language hint (cached per hint).
    fn syntax_for(&self, language: &str) -> Option<&SyntaxReference> {
        let key = language.to_lowercase();
        let mut cache = self
            .syntax_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let idx = *cache.entry(key).or_insert_with_key(|key| {
            self.syntax_set.find_syntax_by_token(key).and_then(|syntax| {
                self.syntax_set
                    .syntaxes()
                    .iter()
                    .position(|s| s.name == syntax.name)
            })
        });

        idx.and_then(|idx| self.syntax_set.syntaxes().get(idx))
    }
}

impl SyntaxHighlighter for SyntectHighlighter {
    fn highlight(&self, text: &str, language: &str) -> Result<String, HighlightError> {
        let syntax = self
            .syntax_for(language)
            .ok_or_else(|| HighlightError::UnsupportedLanguage(language.to_string()))?;

        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        let ranges = highlighter
            .highlight_line(text, &self.syntax_set)
            .map_err(|e| HighlightError::Failed(e.to_string()))?;

        styled_line_to_highlighted_html(&ranges[..], IncludeBackground::No)
            .map_err(|e| HighlightError::Failed(e.to_string()))
    }
}
