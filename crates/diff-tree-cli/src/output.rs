//! Plain-text rendering of trees, diffs and commit lists for the terminal.

use anyhow::Context;
use diff_tree::{DiffStats, FlatEntry, RawChange, RenderedDiff, RenderedRow, TreeNode};
use diff_tree_client::Commit;
use serde::Deserialize;
use std::fmt::Write;

/// Change files hold either a bare record list or a compare response.
#[derive(Deserialize)]
#[serde(untagged)]
enum ChangesDocument {
    Records(Vec<RawChange>),
    Compare { diffs: Vec<RawChange> },
}

/// Parse a change-record JSON document
pub fn parse_changes(json: &str) -> anyhow::Result<Vec<RawChange>> {
    let document: ChangesDocument =
        serde_json::from_str(json).context("Expected a list of change records or an object with `diffs`")?;
    Ok(match document {
        ChangesDocument::Records(records) => records,
        ChangesDocument::Compare { diffs } => diffs,
    })
}

fn format_stats(stats: DiffStats) -> String {
    if stats.is_empty() {
        String::new()
    } else {
        format!("  +{} -{}", stats.additions, stats.deletions)
    }
}

/// One line per row: status column, tree guides, name, line counts
pub fn format_rows(rows: &[FlatEntry]) -> String {
    let mut out = String::new();
    for row in rows {
        let status = if row.is_dir {
            ' '
        } else {
            row.status.map(|s| s.as_char()).unwrap_or(' ')
        };
        let _ = writeln!(
            out,
            "{} {}{}{}{}",
            status,
            row.tree_prefix(),
            row.icon(),
            row.name,
            format_stats(row.stats)
        );
    }
    out
}

/// Closing line with totals
pub fn format_summary(tree: &TreeNode) -> String {
    let files = tree.file_paths().len();
    let stats = tree.stats();
    format!(
        "{} file{} changed, {} insertion{}(+), {} deletion{}(-)",
        files,
        if files == 1 { "" } else { "s" },
        stats.additions,
        if stats.additions == 1 { "" } else { "s" },
        stats.deletions,
        if stats.deletions == 1 { "" } else { "s" },
    )
}

fn line_number(number: Option<u32>) -> String {
    number.map(|n| n.to_string()).unwrap_or_default()
}

/// Diff with line-number gutters
pub fn format_plain_diff(rendered: &RenderedDiff) -> String {
    if rendered.is_empty() {
        return "No differences\n".to_string();
    }

    let mut out = String::new();
    for row in rendered.rows() {
        match row {
            RenderedRow::HunkSeparator => out.push_str("   ⋯      ⋯\n"),
            RenderedRow::Line(line) => {
                let _ = writeln!(
                    out,
                    "{:>5} {:>5} {}{}",
                    line_number(line.old_line_no),
                    line_number(line.new_line_no),
                    line.kind.prefix(),
                    line.raw_text
                );
            }
        }
    }
    out
}

pub fn format_commits(commits: &[Commit]) -> String {
    let mut out = String::new();
    for commit in commits {
        let short_id = if commit.short_id.is_empty() {
            commit.id.chars().take(8).collect()
        } else {
            commit.short_id.clone()
        };
        let _ = writeln!(
            out,
            "{} {} {:<20} {}",
            short_id,
            commit.committed_date.format("%Y-%m-%d"),
            commit.author_name,
            commit.title
        );
    }
    out
}
