//! Added/removed line counting.

use crate::model::DiffStats;

/// Count added and removed lines in a unified diff.
///
/// A line is an addition iff it starts with `+` but not with the `+++`
/// file header; deletions mirror that with `-` and `---`.
pub fn parse_stats(diff_text: Option<&str>) -> DiffStats {
    let Some(text) = diff_text else {
        return DiffStats::default();
    };

    text.lines().fold(DiffStats::default(), |mut stats, line| {
        if line.starts_with('+') && !line.starts_with("+++") {
            stats.additions += 1;
        } else if line.starts_with('-') && !line.starts_with("---") {
            stats.deletions += 1;
        }
        stats
    })
}
