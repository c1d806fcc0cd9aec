//! Trait for word-level comparison of a paired old/new line.

use crate::model::WordSpan;

/// Computes ordered word-level spans between two versions of a line.
///
/// Spans are tagged unchanged, added or removed. Concatenating the
/// unchanged and removed spans yields `old`; unchanged and added yields `new`.
pub trait WordDiffer: Send + Sync {
    fn diff_words(&self, old: &str, new: &str) -> Vec<WordSpan>;
}
