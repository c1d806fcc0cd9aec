//! Rendering-time diff structures.

use std::fmt::Write as _;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Marker rendered in place of a diff when there is nothing to show.
pub const NO_DIFF_PLACEHOLDER: &str = r#"<div class="diff-empty">No differences</div>"#;

/// Added/removed line counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DiffStats {
    pub additions: usize,
    pub deletions: usize,
}

impl DiffStats {
    pub fn new(additions: usize, deletions: usize) -> Self {
        Self {
            additions,
            deletions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.additions == 0 && self.deletions == 0
    }
}

impl Add for DiffStats {
    type Output = DiffStats;

    fn add(self, rhs: DiffStats) -> DiffStats {
        DiffStats::new(self.additions + rhs.additions, self.deletions + rhs.deletions)
    }
}

impl AddAssign for DiffStats {
    fn add_assign(&mut self, rhs: DiffStats) {
        *self = *self + rhs;
    }
}

impl Sub for DiffStats {
    type Output = DiffStats;

    fn sub(self, rhs: DiffStats) -> DiffStats {
        DiffStats::new(
            self.additions.saturating_sub(rhs.additions),
            self.deletions.saturating_sub(rhs.deletions),
        )
    }
}

impl SubAssign for DiffStats {
    fn sub_assign(&mut self, rhs: DiffStats) {
        *self = *self - rhs;
    }
}

/// Line type in the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Unchanged line.
    Context,
    /// Added line (+).
    Added,
    /// Removed line (-).
    Removed,
}

impl LineKind {
    /// Get the prefix character for this line type.
    pub fn prefix(&self) -> char {
        match self {
            LineKind::Context => ' ',
            LineKind::Added => '+',
            LineKind::Removed => '-',
        }
    }

    /// CSS class for the row.
    pub fn css_class(&self) -> &'static str {
        match self {
            LineKind::Context => "diff-context",
            LineKind::Added => "diff-added",
            LineKind::Removed => "diff-removed",
        }
    }
}

/// Classification of a word-level span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordSpanKind {
    Unchanged,
    Added,
    Removed,
}

impl WordSpanKind {
    /// CSS class for changed spans, `None` for unchanged text.
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            WordSpanKind::Unchanged => None,
            WordSpanKind::Added => Some("word-added"),
            WordSpanKind::Removed => Some("word-removed"),
        }
    }
}

/// A run of text from a word-level diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSpan {
    pub kind: WordSpanKind,
    pub value: String,
}

impl WordSpan {
    pub fn new(kind: WordSpanKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// A single rendered diff line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub kind: LineKind,
    /// Line number in the old file (context and removed lines).
    pub old_line_no: Option<u32>,
    /// Line number in the new file (context and added lines).
    pub new_line_no: Option<u32>,
    /// Line content without the leading +/-/space.
    pub raw_text: String,
    /// Highlighted, HTML-safe content.
    pub rendered_html: String,
    /// Word-level spans, present only for paired modifications.
    pub word_spans: Option<Vec<WordSpan>>,
}

impl DiffLine {
    /// Whether this line is half of a paired modification.
    pub fn is_paired(&self) -> bool {
        self.word_spans.is_some()
    }
}

/// One row of a rendered diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedRow {
    /// Visual break between two hunks.
    HunkSeparator,
    Line(DiffLine),
}

/// Result of rendering a file's diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedDiff {
    /// Nothing to show; renders [`NO_DIFF_PLACEHOLDER`].
    Empty,
    Rows(Vec<RenderedRow>),
}

impl RenderedDiff {
    pub fn is_empty(&self) -> bool {
        matches!(self, RenderedDiff::Empty)
    }

    /// Rendered rows (empty for the placeholder).
    pub fn rows(&self) -> &[RenderedRow] {
        match self {
            RenderedDiff::Empty => &[],
            RenderedDiff::Rows(rows) => rows,
        }
    }

    /// Iterate over the diff lines, skipping separators.
    pub fn lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.rows().iter().filter_map(|row| match row {
            RenderedRow::Line(line) => Some(line),
            RenderedRow::HunkSeparator => None,
        })
    }

    /// Render as an HTML table with old/new line-number cells.
    pub fn to_html(&self) -> String {
        let rows = match self {
            RenderedDiff::Empty => return NO_DIFF_PLACEHOLDER.to_string(),
            RenderedDiff::Rows(rows) => rows,
        };

        let mut html = String::from(r#"<table class="diff-table"><tbody>"#);
        for row in rows {
            match row {
                RenderedRow::HunkSeparator => {
                    html.push_str(r#"<tr class="diff-hunk-separator"><td colspan="3"></td></tr>"#);
                }
                RenderedRow::Line(line) => {
                    let _ = write!(
                        html,
                        r#"<tr class="diff-line {}"><td class="diff-line-num old">{}</td><td class="diff-line-num new">{}</td><td class="diff-line-content"><span class="diff-prefix">{}</span>{}</td></tr>"#,
                        line.kind.css_class(),
                        line_number_cell(line.old_line_no),
                        line_number_cell(line.new_line_no),
                        line.kind.prefix(),
                        line.rendered_html,
                    );
                }
            }
        }
        html.push_str("</tbody></table>");
        html
    }
}

fn line_number_cell(number: Option<u32>) -> String {
    number.map(|n| n.to_string()).unwrap_or_default()
}

/// A reconstructed unified-diff hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    pub old_start: u32,
    pub new_start: u32,
    pub old_count: u32,
    pub new_count: u32,
    /// Prefixed lines (`+text`, `-text`, ` text`).
    pub lines: Vec<String>,
}

impl DiffHunk {
    pub fn new(old_start: u32, new_start: u32) -> Self {
        Self {
            old_start,
            new_start,
            old_count: 0,
            new_count: 0,
            lines: Vec::new(),
        }
    }

    /// Append a line, updating the counts for its kind.
    pub fn push(&mut self, kind: LineKind, text: &str) {
        match kind {
            LineKind::Context => {
                self.old_count += 1;
                self.new_count += 1;
            }
            LineKind::Added => self.new_count += 1,
            LineKind::Removed => self.old_count += 1,
        }
        self.lines.push(format!("{}{}", kind.prefix(), text));
    }

    /// Header line, e.g. `@@ -10,5 +10,7 @@`.
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_count, self.new_start, self.new_count
        )
    }

    /// Header followed by the prefixed lines, newline separated.
    pub fn to_text(&self) -> String {
        let mut text = self.header();
        for line in &self.lines {
            text.push('\n');
            text.push_str(line);
        }
        text
    }
}
