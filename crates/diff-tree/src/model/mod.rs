//! Data models for change sets, file trees and rendered diffs.

mod change;
mod diff;
mod file_tree;

pub use change::{FileChange, FileStatus, RawChange};
pub use diff::{
    DiffHunk, DiffLine, DiffStats, LineKind, RenderedDiff, RenderedRow, WordSpan, WordSpanKind,
    NO_DIFF_PLACEHOLDER,
};
pub use file_tree::{FileNode, FlatEntry, FolderNode, TreeNode, ROOT_NAME};
