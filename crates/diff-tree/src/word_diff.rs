//! Word-level diff backed by `similar`.

use crate::model::{WordSpan, WordSpanKind};
use crate::traits::WordDiffer;
use similar::{ChangeTag, TextDiff};

/// Word differ using the LCS-based word tokenizer from `similar`.
///
/// Adjacent tokens with the same tag are merged into one span.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarWordDiffer;

impl WordDiffer for SimilarWordDiffer {
    fn diff_words(&self, old: &str, new: &str) -> Vec<WordSpan> {
        let diff = TextDiff::from_words(old, new);
        let mut spans: Vec<WordSpan> = Vec::new();

        for change in diff.iter_all_changes() {
            let kind = match change.tag() {
                ChangeTag::Equal => WordSpanKind::Unchanged,
                ChangeTag::Delete => WordSpanKind::Removed,
                ChangeTag::Insert => WordSpanKind::Added,
            };
            let value = change.value();

            match spans.last_mut() {
                Some(last) if last.kind == kind => last.value.push_str(value),
                _ => spans.push(WordSpan::new(kind, value)),
            }
        }

        spans
    }
}
