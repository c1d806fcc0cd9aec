//! Reconstruct unified-diff text from a rendered HTML diff fragment.
//!
//! Used when the API omits the diff text (seen for branch comparisons) and
//! only the per-file HTML diff is available. The fragment carries no hunk
//! metadata, so hunk boundaries are inferred from line-number jumps. The
//! result is a best-effort approximation of the original diff.
//!
//! Markup understood:
//!
//! ```html
//! <tr class="line_holder old" data-old-line="6">
//!   <td class="line_content">removed text</td>
//! </tr>
//! <tr class="line_holder">
//!   <td class="old_line" data-linenumber="7"></td>
//!   <td class="new_line" data-linenumber="7"></td>
//!   <td class="line_content">context text</td>
//! </tr>
//! ```
//!
//! Class `old` marks a removed line, `new` an added line, anything else is
//! context. Rows with class `match` are rendered hunk headers and skipped.

use crate::model::{DiffHunk, LineKind};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

struct Selectors {
    line: Selector,
    content: Selector,
    old_number: Selector,
    new_number: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| Selectors {
        line: Selector::parse(".line_holder").expect("line selector"),
        content: Selector::parse(".line_content").expect("content selector"),
        old_number: Selector::parse(".old_line[data-linenumber]").expect("old number selector"),
        new_number: Selector::parse(".new_line[data-linenumber]").expect("new number selector"),
    })
}

/// One diff line read from the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HtmlLine {
    kind: LineKind,
    old_number: Option<u32>,
    new_number: Option<u32>,
    text: String,
}

/// Rebuild unified-diff hunks from an HTML diff fragment.
///
/// Returns an empty string when the fragment holds no recognizable lines.
pub fn extract_diff_from_html(html: &str) -> String {
    let document = Html::parse_fragment(&wrap_table_rows(html));
    let lines: Vec<HtmlLine> = document
        .select(&selectors().line)
        .filter_map(read_line)
        .collect();

    let hunks = group_into_hunks(lines);
    log::debug!("Reconstructed {} hunks from HTML diff", hunks.len());

    hunks
        .iter()
        .map(DiffHunk::to_text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn tag_regex() -> &'static (Regex, Regex) {
    static TAGS: OnceLock<(Regex, Regex)> = OnceLock::new();
    TAGS.get_or_init(|| {
        (
            Regex::new(r"(?i)<tr[\s>/]").expect("row tag pattern"),
            Regex::new(r"(?i)<(table|tbody|thead)[\s>/]").expect("table tag pattern"),
        )
    })
}

/// Bare `<tr>` rows are discarded by the HTML parser outside a table.
fn wrap_table_rows(html: &str) -> String {
    let (row, table) = tag_regex();
    if row.is_match(html) && !table.is_match(html) {
        format!("<table>{}</table>", html)
    } else {
        html.to_string()
    }
}

fn read_line(element: ElementRef<'_>) -> Option<HtmlLine> {
    let has_class = |name: &str| element.value().classes().any(|c| c == name);

    if has_class("match") {
        return None;
    }

    let raw_text: String = match element.select(&selectors().content).next() {
        Some(content) => content.text().collect(),
        None => element.text().collect(),
    };
    let text = raw_text.replace(['\r', '\n'], "");

    let marker = text.trim_start();
    if marker.starts_with("@@") || marker.starts_with("\\ No newline") {
        return None;
    }

    let kind = if has_class("old") {
        LineKind::Removed
    } else if has_class("new") {
        LineKind::Added
    } else {
        LineKind::Context
    };

    Some(HtmlLine {
        kind,
        old_number: line_number(element, "data-old-line", &selectors().old_number),
        new_number: line_number(element, "data-new-line", &selectors().new_number),
        text,
    })
}

/// Number from the element's own attribute, else from a numbered cell.
fn line_number(element: ElementRef<'_>, attr: &str, cell: &Selector) -> Option<u32> {
    element
        .value()
        .attr(attr)
        .or_else(|| {
            element
                .select(cell)
                .next()
                .and_then(|c| c.value().attr("data-linenumber"))
        })
        .and_then(|n| n.trim().parse().ok())
}

/// Whether `current` jumps by more than one past the last number seen in
/// that column.
fn jumps(last: Option<u32>, current: Option<u32>) -> bool {
    matches!((last, current), (Some(last), Some(current)) if current > last.saturating_add(1))
}

fn group_into_hunks(lines: Vec<HtmlLine>) -> Vec<DiffHunk> {
    let mut hunks = Vec::new();
    let mut current: Option<DiffHunk> = None;
    let mut last_old: Option<u32> = None;
    let mut last_new: Option<u32> = None;

    for line in lines {
        let starts_new = current.is_none()
            || jumps(last_old, line.old_number)
            || jumps(last_new, line.new_number);

        if starts_new {
            hunks.extend(current.take());
            current = Some(DiffHunk::new(
                line.old_number.unwrap_or(1),
                line.new_number.unwrap_or(1),
            ));
            last_old = None;
            last_new = None;
        }

        if let Some(hunk) = current.as_mut() {
            hunk.push(line.kind, &line.text);
        }
        if line.old_number.is_some() {
            last_old = line.old_number;
        }
        if line.new_number.is_some() {
            last_new = line.new_number;
        }
    }

    hunks.extend(current);
    hunks
}
