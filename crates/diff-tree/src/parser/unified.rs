//! Render unified diff text into typed, highlighted rows.

use crate::highlight::{escape_html, language_for_path};
use crate::model::{DiffLine, LineKind, RenderedDiff, RenderedRow, WordSpan, WordSpanKind};
use crate::traits::{SyntaxHighlighter, WordDiffer};
use regex::Regex;
use std::sync::OnceLock;

fn hunk_header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^@@ -(\d+)(?:,\d+)? \+(\d+)(?:,\d+)? @@").expect("hunk header pattern")
    })
}

/// A classified input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputLine<'a> {
    /// `@@` line, with (old_start, new_start) when well formed.
    HunkHeader(Option<(u32, u32)>),
    /// `+++`, `---` and `\ No newline` markers.
    Skipped,
    Context(&'a str),
    Added(&'a str),
    Removed(&'a str),
    /// Anything else (`diff --git`, `index ...`, stray text).
    Dropped,
}

fn classify(line: &str) -> InputLine<'_> {
    if line.starts_with("@@") {
        return InputLine::HunkHeader(parse_hunk_header(line));
    }
    if line.starts_with("+++") || line.starts_with("---") || line.starts_with('\\') {
        return InputLine::Skipped;
    }
    if let Some(rest) = line.strip_prefix('+') {
        InputLine::Added(rest)
    } else if let Some(rest) = line.strip_prefix('-') {
        InputLine::Removed(rest)
    } else if let Some(rest) = line.strip_prefix(' ') {
        InputLine::Context(rest)
    } else {
        InputLine::Dropped
    }
}

fn parse_hunk_header(line: &str) -> Option<(u32, u32)> {
    let caps = hunk_header_regex().captures(line)?;
    let old_start = caps.get(1)?.as_str().parse().ok()?;
    let new_start = caps.get(2)?.as_str().parse().ok()?;
    Some((old_start, new_start))
}

/// Render a file's unified diff.
///
/// Equal-length runs of removed lines immediately followed by added lines
/// are rendered as paired modifications with word-level spans. Missing or
/// empty diff text yields [`RenderedDiff::Empty`]. Never fails: unknown
/// languages and highlighter errors fall back to escaped text, malformed
/// hunk headers leave the line counters where they were.
///
/// # Example
/// ```ignore
/// let rendered = render_diff(Some(diff_text), "src/main.rs", &highlighter, &SimilarWordDiffer);
/// println!("{}", rendered.to_html());
/// ```
pub fn render_diff(
    diff_text: Option<&str>,
    file_path: &str,
    highlighter: &dyn SyntaxHighlighter,
    word_differ: &dyn WordDiffer,
) -> RenderedDiff {
    let Some(text) = diff_text.filter(|t| !t.trim().is_empty()) else {
        return RenderedDiff::Empty;
    };

    let renderer = Renderer {
        language: language_for_path(file_path),
        highlighter,
        word_differ,
    };
    let rows = renderer.render(text);

    if rows.iter().all(|row| matches!(row, RenderedRow::HunkSeparator)) {
        log::debug!("No renderable lines in diff for {}", file_path);
        return RenderedDiff::Empty;
    }
    RenderedDiff::Rows(rows)
}

struct Renderer<'a> {
    language: Option<String>,
    highlighter: &'a dyn SyntaxHighlighter,
    word_differ: &'a dyn WordDiffer,
}

impl Renderer<'_> {
    fn render(&self, text: &str) -> Vec<RenderedRow> {
        let lines: Vec<InputLine<'_>> = text.lines().map(classify).collect();
        let mut rows = Vec::new();
        let mut old_no: u32 = 0;
        let mut new_no: u32 = 0;
        let mut seen_hunk = false;
        let mut i = 0;

        while i < lines.len() {
            match lines[i] {
                InputLine::HunkHeader(starts) => {
                    if seen_hunk {
                        rows.push(RenderedRow::HunkSeparator);
                    }
                    seen_hunk = true;
                    if let Some((old_start, new_start)) = starts {
                        old_no = old_start;
                        new_no = new_start;
                    }
                    i += 1;
                }
                InputLine::Removed(_) => {
                    let removed = collect_run(&lines[i..], |l| match l {
                        InputLine::Removed(t) => Some(t),
                        _ => None,
                    });
                    let after_removed = i + removed.len();
                    let added = collect_run(&lines[after_removed..], |l| match l {
                        InputLine::Added(t) => Some(t),
                        _ => None,
                    });

                    if removed.len() == added.len() {
                        self.render_paired(&removed, &added, &mut old_no, &mut new_no, &mut rows);
                        i = after_removed + added.len();
                    } else {
                        // Unequal runs: removed lines now, added lines on later iterations.
                        for text in removed {
                            rows.push(self.plain_line(LineKind::Removed, text, &mut old_no, &mut new_no));
                        }
                        i = after_removed;
                    }
                }
                InputLine::Added(text) => {
                    rows.push(self.plain_line(LineKind::Added, text, &mut old_no, &mut new_no));
                    i += 1;
                }
                InputLine::Context(text) => {
                    rows.push(self.plain_line(LineKind::Context, text, &mut old_no, &mut new_no));
                    i += 1;
                }
                InputLine::Skipped | InputLine::Dropped => i += 1,
            }
        }

        rows
    }

    fn plain_line(
        &self,
        kind: LineKind,
        text: &str,
        old_no: &mut u32,
        new_no: &mut u32,
    ) -> RenderedRow {
        let (old_line_no, new_line_no) = advance(kind, old_no, new_no);
        RenderedRow::Line(DiffLine {
            kind,
            old_line_no,
            new_line_no,
            raw_text: text.to_string(),
            rendered_html: self.highlight_segment(text),
            word_spans: None,
        })
    }

    /// Removed lines first, then added lines; one word diff per pair, reused
    /// for both sides.
    fn render_paired(
        &self,
        removed: &[&str],
        added: &[&str],
        old_no: &mut u32,
        new_no: &mut u32,
        rows: &mut Vec<RenderedRow>,
    ) {
        let pair_spans: Vec<Vec<WordSpan>> = removed
            .iter()
            .zip(added)
            .map(|(old, new)| self.word_differ.diff_words(old, new))
            .collect();

        for (text, spans) in removed.iter().zip(&pair_spans) {
            rows.push(self.paired_line(LineKind::Removed, text, spans, old_no, new_no));
        }
        for (text, spans) in added.iter().zip(&pair_spans) {
            rows.push(self.paired_line(LineKind::Added, text, spans, old_no, new_no));
        }
    }

    fn paired_line(
        &self,
        kind: LineKind,
        text: &str,
        spans: &[WordSpan],
        old_no: &mut u32,
        new_no: &mut u32,
    ) -> RenderedRow {
        let hidden = match kind {
            LineKind::Removed => WordSpanKind::Added,
            _ => WordSpanKind::Removed,
        };
        let side: Vec<WordSpan> = spans.iter().filter(|s| s.kind != hidden).cloned().collect();

        let rendered_html = side
            .iter()
            .map(|span| match span.kind.css_class() {
                None => self.highlight_segment(&span.value),
                Some(class) => format!(
                    r#"<span class="{}">{}</span>"#,
                    class,
                    escape_html(&span.value)
                ),
            })
            .collect();

        let (old_line_no, new_line_no) = advance(kind, old_no, new_no);
        RenderedRow::Line(DiffLine {
            kind,
            old_line_no,
            new_line_no,
            raw_text: text.to_string(),
            rendered_html,
            word_spans: Some(side),
        })
    }

    fn highlight_segment(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let Some(language) = self.language.as_deref() else {
            return escape_html(text);
        };
        self.highlighter
            .highlight(text, language)
            .unwrap_or_else(|e| {
                log::trace!("Highlight fallback for {}: {}", language, e);
                escape_html(text)
            })
    }
}

/// Collect the texts of the leading lines accepted by `pick`.
fn collect_run<'a>(
    lines: &[InputLine<'a>],
    pick: impl Fn(InputLine<'a>) -> Option<&'a str>,
) -> Vec<&'a str> {
    lines.iter().map_while(|l| pick(*l)).collect()
}

/// Line numbers shown for a line of `kind`, advancing the counters.
///
/// Counters saturate at `u32::MAX` rather than wrapping.
fn advance(kind: LineKind, old_no: &mut u32, new_no: &mut u32) -> (Option<u32>, Option<u32>) {
    match kind {
        LineKind::Context => {
            let numbers = (Some(*old_no), Some(*new_no));
            *old_no = old_no.saturating_add(1);
            *new_no = new_no.saturating_add(1);
            numbers
        }
        LineKind::Added => {
            let numbers = (None, Some(*new_no));
            *new_no = new_no.saturating_add(1);
            numbers
        }
        LineKind::Removed => {
            let numbers = (Some(*old_no), None);
            *old_no = old_no.saturating_add(1);
            numbers
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NO_DIFF_PLACEHOLDER;
    use crate::traits::PlainTextHighlighter;
    use crate::word_diff::SimilarWordDiffer;
    use pretty_assertions::assert_eq;

    fn render(diff: &str) -> RenderedDiff {
        render_diff(Some(diff), "src/lib.rs", &PlainTextHighlighter, &SimilarWordDiffer)
    }

    fn numbers(rendered: &RenderedDiff) -> Vec<(LineKind, Option<u32>, Option<u32>)> {
        rendered
            .lines()
            .map(|l| (l.kind, l.old_line_no, l.new_line_no))
            .collect()
    }

    #[test]
    fn test_empty_diff_placeholder() {
        let none = render_diff(None, "a.rs", &PlainTextHighlighter, &SimilarWordDiffer);
        let empty = render_diff(Some(""), "a.rs", &PlainTextHighlighter, &SimilarWordDiffer);
        assert!(none.is_empty());
        assert!(empty.is_empty());
        assert_eq!(none.to_html(), NO_DIFF_PLACEHOLDER);
        assert_eq!(empty.to_html(), NO_DIFF_PLACEHOLDER);
    }

    #[test]
    fn test_line_numbers_follow_hunk_header() {
        let rendered = render("@@ -1,2 +1,3 @@\n context\n-removed\n+added one\n+added two\n");
        assert_eq!(
            numbers(&rendered),
            vec![
                (LineKind::Context, Some(1), Some(1)),
                (LineKind::Removed, Some(2), None),
                (LineKind::Added, None, Some(2)),
                (LineKind::Added, None, Some(3)),
            ]
        );

        let html = rendered.to_html();
        assert!(html.contains(r#"<td class="diff-line-num old">2</td><td class="diff-line-num new"></td>"#));
        assert!(html.contains(r#"<td class="diff-line-num old"></td><td class="diff-line-num new">3</td>"#));
    }

    #[test]
    fn test_paired_modification_equal_runs() {
        let diff = "@@ -1,2 +1,2 @@\n-let a = 1;\n-let b = 2;\n+let a = 10;\n+let b = 2;\n";
        let rendered = render(diff);
        let lines: Vec<_> = rendered.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| l.is_paired()));
        assert_eq!(lines[0].kind, LineKind::Removed);
        assert_eq!(lines[1].kind, LineKind::Removed);
        assert_eq!(lines[2].kind, LineKind::Added);
        assert_eq!(lines[3].kind, LineKind::Added);

        assert!(lines[0].rendered_html.contains(r#"<span class="word-removed">1;</span>"#));
        assert!(lines[2].rendered_html.contains(r#"<span class="word-added">10;</span>"#));
        assert!(!lines[0].rendered_html.contains("word-added"));

        // Unchanged second pair has no changed spans at all.
        assert!(!lines[1].rendered_html.contains("word-"));
        assert_eq!(lines[3].rendered_html, "let b = 2;");

        assert_eq!(
            numbers(&rendered),
            vec![
                (LineKind::Removed, Some(1), None),
                (LineKind::Removed, Some(2), None),
                (LineKind::Added, None, Some(1)),
                (LineKind::Added, None, Some(2)),
            ]
        );
    }

    #[test]
    fn test_unequal_runs_not_paired() {
        let diff = "@@ -1,1 +1,2 @@\n-old line\n+new line\n+another\n";
        let rendered = render(diff);
        let lines: Vec<_> = rendered.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| !l.is_paired()));
        assert!(lines.iter().all(|l| !l.rendered_html.contains("word-")));
        assert_eq!(
            numbers(&rendered),
            vec![
                (LineKind::Removed, Some(1), None),
                (LineKind::Added, None, Some(1)),
                (LineKind::Added, None, Some(2)),
            ]
        );
    }

    #[test]
    fn test_removed_run_without_added_run() {
        let rendered = render("@@ -3,2 +3,1 @@\n-gone\n keep\n");
        assert_eq!(
            numbers(&rendered),
            vec![
                (LineKind::Removed, Some(3), None),
                (LineKind::Context, Some(4), Some(3)),
            ]
        );
        assert!(rendered.lines().all(|l| !l.is_paired()));
    }

    #[test]
    fn test_separator_between_hunks_only() {
        let diff = "@@ -1 +1 @@\n a\n@@ -10 +10 @@\n b\n";
        let rendered = render(diff);
        let rows = rendered.rows();

        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[0], RenderedRow::Line(_)));
        assert_eq!(rows[1], RenderedRow::HunkSeparator);
        assert_eq!(
            numbers(&rendered),
            vec![
                (LineKind::Context, Some(1), Some(1)),
                (LineKind::Context, Some(10), Some(10)),
            ]
        );
    }

    #[test]
    fn test_headers_and_markers_skipped() {
        let diff = "diff --git a/x b/x\nindex 1..2 100644\n--- a/x\n+++ b/x\n@@ -1 +1 @@\n-a\n\\ No newline at end of file\n+b\n";
        let rendered = render(diff);
        let lines: Vec<_> = rendered.lines().collect();

        // The marker sits between the runs, so they do not pair.
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].raw_text, "a");
        assert_eq!(lines[1].raw_text, "b");
        assert!(!lines[0].is_paired());
    }

    #[test]
    fn test_missing_hunk_header_counts_from_zero() {
        let rendered = render(" first\n+second\n");
        assert_eq!(
            numbers(&rendered),
            vec![
                (LineKind::Context, Some(0), Some(0)),
                (LineKind::Added, None, Some(1)),
            ]
        );
    }

    #[test]
    fn test_malformed_hunk_header_keeps_counters() {
        let rendered = render("@@ -5 +5 @@\n a\n@@ garbage @@\n b\n");
        assert_eq!(
            numbers(&rendered),
            vec![
                (LineKind::Context, Some(5), Some(5)),
                (LineKind::Context, Some(6), Some(6)),
            ]
        );
        assert_eq!(rendered.rows()[1], RenderedRow::HunkSeparator);
    }

    #[test]
    fn test_content_is_escaped() {
        let rendered = render("@@ -1 +1 @@\n <b>&</b>\n");
        let line = rendered.lines().next().unwrap();
        assert_eq!(line.raw_text, "<b>&</b>");
        assert_eq!(line.rendered_html, "&lt;b&gt;&amp;&lt;/b&gt;");
    }

    #[test]
    fn test_only_headers_is_empty() {
        assert!(render("--- a/x\n+++ b/x\n").is_empty());
    }

    #[test]
    fn test_highlighter_failure_falls_back() {
        use crate::traits::HighlightError;

        struct Failing;
        impl SyntaxHighlighter for Failing {
            fn highlight(&self, _text: &str, _language: &str) -> Result<String, HighlightError> {
                Err(HighlightError::Failed("boom".to_string()))
            }
        }

        let rendered = render_diff(Some("@@ -1 +1 @@\n a<b\n"), "x.rs", &Failing, &SimilarWordDiffer);
        assert_eq!(rendered.lines().next().unwrap().rendered_html, "a&lt;b");
    }

    #[test]
    fn test_language_hint_passed_to_highlighter() {
        use crate::traits::HighlightError;
        use std::sync::Mutex;

        struct Recording(Mutex<Vec<String>>);
        impl SyntaxHighlighter for Recording {
            fn highlight(&self, text: &str, language: &str) -> Result<String, HighlightError> {
                self.0.lock().unwrap().push(language.to_string());
                Ok(text.to_string())
            }
        }

        let recording = Recording(Mutex::new(Vec::new()));
        render_diff(Some("@@ -1 +1 @@\n FROM rust\n"), "build/Dockerfile", &recording, &SimilarWordDiffer);
        assert_eq!(*recording.0.lock().unwrap(), vec!["dockerfile".to_string()]);
    }

    #[test]
    fn test_line_numbers_saturate_at_u32_max() {
        let rendered = render("@@ -4294967295,2 +4294967295,2 @@\n a\n b\n-c\n+d\n");
        assert_eq!(
            numbers(&rendered),
            vec![
                (LineKind::Context, Some(u32::MAX), Some(u32::MAX)),
                (LineKind::Context, Some(u32::MAX), Some(u32::MAX)),
                (LineKind::Removed, Some(u32::MAX), None),
                (LineKind::Added, None, Some(u32::MAX)),
            ]
        );
    }
}
