//! # diff-tree
//!
//! Turns the changed files of a commit, branch comparison or commit list
//! into a collapsible folder tree and renders their unified diffs as
//! syntax-highlighted HTML with word-level change marks.
//!
//! ## Design Principles
//!
//! This crate is **instrumented**: it receives change records and returns
//! data, without calling remote APIs or keeping ambient state. Syntax
//! highlighting and word diffing are injected through the
//! [`SyntaxHighlighter`] and [`WordDiffer`] traits, and per-panel context
//! lives in a [`ViewSession`].
//!
//! None of the public functions fail: a missing diff renders a
//! "no differences" placeholder, unknown languages render escaped text.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use diff_tree::{build_file_tree, FileChange, RawChange, ViewSession};
//!
//! let files = FileChange::from_raw_list(&records, Some("main"));
//! let session = ViewSession::with_theme("group/project", "base16-ocean.dark");
//! let tree = session.build_tree(&files);
//!
//! for row in session.rows(&tree) {
//!     println!("{}{}{}", row.tree_prefix(), row.icon(), row.name);
//! }
//!
//! if let Some(rendered) = session.render_path(&tree, "src/main.rs") {
//!     println!("{}", rendered.to_html());
//! }
//! ```

pub mod highlight;
pub mod model;
pub mod parser;
pub mod session;
pub mod traits;
pub mod tree_builder;
pub mod word_diff;

// Re-export commonly used types
pub use highlight::{escape_html, language_for_path, SyntectHighlighter};
pub use model::{
    DiffHunk, DiffLine, DiffStats, FileChange, FileNode, FileStatus, FlatEntry, FolderNode,
    LineKind, RawChange, RenderedDiff, RenderedRow, TreeNode, WordSpan, WordSpanKind,
    NO_DIFF_PLACEHOLDER,
};
pub use parser::{extract_diff_from_html, parse_stats, render_diff};
pub use session::{ViewMode, ViewSession};
pub use traits::{HighlightError, PlainTextHighlighter, SyntaxHighlighter, WordDiffer};
pub use tree_builder::build_file_tree;
pub use word_diff::SimilarWordDiffer;
