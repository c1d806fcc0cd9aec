//! Collaborator traits the rendering pipeline is instrumented with.

mod syntax_highlighter;
mod word_differ;

pub use syntax_highlighter::{HighlightError, PlainTextHighlighter, SyntaxHighlighter};
pub use word_differ::WordDiffer;
