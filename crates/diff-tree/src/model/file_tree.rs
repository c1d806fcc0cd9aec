//! File tree model for navigating a change set.

use super::{DiffStats, FileChange, FileStatus};
use std::collections::BTreeMap;

/// Name of the root folder.
pub const ROOT_NAME: &str = "/";

/// Node in the file tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Folder(FolderNode),
    File(FileNode),
}

/// A directory. Stats are the sum over every file below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    /// Display name, `a/b` after folder collapsing.
    pub name: String,
    /// Child nodes keyed by their display name.
    pub children: BTreeMap<String, TreeNode>,
    /// Status inferred from descendants (display heuristic).
    pub status: Option<FileStatus>,
    pub stats: DiffStats,
}

/// A changed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// Last path segment.
    pub name: String,
    /// Full path.
    pub path: String,
    pub old_path: String,
    pub status: FileStatus,
    pub diff_text: Option<String>,
    pub has_diff: bool,
    pub stats: DiffStats,
    pub git_ref: Option<String>,
}

impl FolderNode {
    /// Create an empty folder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: BTreeMap::new(),
            status: None,
            stats: DiffStats::default(),
        }
    }

    /// Children in display order: folders first, then files, both alphabetically.
    pub fn sorted_children(&self) -> Vec<&TreeNode> {
        let mut children: Vec<&TreeNode> = self.children.values().collect();
        children.sort_by(|a, b| match (a.is_folder(), b.is_folder()) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            _ => a.name().cmp(b.name()),
        });
        children
    }
}

impl FileNode {
    /// Create a file node from a change, keyed by `name`.
    pub fn from_change(name: impl Into<String>, change: &FileChange, stats: DiffStats) -> Self {
        Self {
            name: name.into(),
            path: change.path.clone(),
            old_path: change.old_path.clone(),
            status: change.status,
            diff_text: change.diff_text.clone(),
            has_diff: change.has_diff,
            stats,
            git_ref: change.git_ref.clone(),
        }
    }
}

impl TreeNode {
    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Folder(folder) => &folder.name,
            TreeNode::File(file) => &file.name,
        }
    }

    pub fn stats(&self) -> DiffStats {
        match self {
            TreeNode::Folder(folder) => folder.stats,
            TreeNode::File(file) => file.stats,
        }
    }

    pub fn status(&self) -> Option<FileStatus> {
        match self {
            TreeNode::Folder(folder) => folder.status,
            TreeNode::File(file) => Some(file.status),
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, TreeNode::Folder(_))
    }

    pub fn as_folder(&self) -> Option<&FolderNode> {
        match self {
            TreeNode::Folder(folder) => Some(folder),
            TreeNode::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            TreeNode::File(file) => Some(file),
            TreeNode::Folder(_) => None,
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        match self {
            TreeNode::Folder(folder) => {
                1 + folder.children.values().map(TreeNode::node_count).sum::<usize>()
            }
            TreeNode::File(_) => 1,
        }
    }

    /// Find a file by its full path.
    pub fn find_file(&self, path: &str) -> Option<&FileNode> {
        match self {
            TreeNode::File(file) if file.path == path => Some(file),
            TreeNode::File(_) => None,
            TreeNode::Folder(folder) => folder
                .children
                .values()
                .find_map(|child| child.find_file(path)),
        }
    }

    /// Flatten the tree into display rows. The root itself is not emitted.
    pub fn flatten(&self) -> Vec<FlatEntry> {
        let mut result = Vec::new();
        if let TreeNode::Folder(root) = self {
            flatten_children(root, 0, &[], &mut result);
        } else {
            push_entry(self, 0, true, &[], &mut result);
        }
        result
    }

    /// File paths in display order.
    pub fn file_paths(&self) -> Vec<String> {
        self.flatten().into_iter().filter_map(|e| e.path).collect()
    }
}

fn flatten_children(
    folder: &FolderNode,
    depth: usize,
    ancestor_has_next: &[bool],
    result: &mut Vec<FlatEntry>,
) {
    let children = folder.sorted_children();
    let child_count = children.len();

    for (i, child) in children.into_iter().enumerate() {
        let is_last = i == child_count - 1;
        push_entry(child, depth, is_last, ancestor_has_next, result);

        if let TreeNode::Folder(sub) = child {
            let mut child_ancestor_has_next = ancestor_has_next.to_vec();
            child_ancestor_has_next.push(!is_last);
            flatten_children(sub, depth + 1, &child_ancestor_has_next, result);
        }
    }
}

fn push_entry(
    node: &TreeNode,
    depth: usize,
    is_last: bool,
    ancestor_has_next: &[bool],
    result: &mut Vec<FlatEntry>,
) {
    result.push(FlatEntry {
        depth,
        name: node.name().to_string(),
        path: node.as_file().map(|f| f.path.clone()),
        is_dir: node.is_folder(),
        status: node.status(),
        stats: node.stats(),
        is_last,
        // The top level draws no guides, so its own ancestor entry is dropped.
        ancestor_has_next: ancestor_has_next.iter().skip(1).copied().collect(),
    });
}

/// A flattened file tree entry for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatEntry {
    /// Nesting depth (0 = top level).
    pub depth: usize,
    pub name: String,
    /// Full path (for files, None for folders).
    pub path: Option<String>,
    pub is_dir: bool,
    pub status: Option<FileStatus>,
    pub stats: DiffStats,
    /// Whether this is the last item in its parent.
    pub is_last: bool,
    /// For each ancestor level below the top, whether that ancestor has more
    /// siblings below. Drives the vertical `│` guides.
    pub ancestor_has_next: Vec<bool>,
}

impl FlatEntry {
    pub fn icon(&self) -> &'static str {
        if self.is_dir {
            "▼ "
        } else {
            "  "
        }
    }

    /// Tree prefix with guide lines.
    /// - Top level: ""
    /// - First child: "├─ "
    /// - Last child: "└─ "
    /// - Nested with siblings above: "│  ├─ "
    pub fn tree_prefix(&self) -> String {
        if self.depth == 0 {
            return String::new();
        }

        let mut prefix = String::new();
        for &has_next in &self.ancestor_has_next {
            if has_next {
                prefix.push_str("│  ");
            } else {
                prefix.push_str("   ");
            }
        }

        if self.is_last {
            prefix.push_str("└─ ");
        } else {
            prefix.push_str("├─ ");
        }

        prefix
    }
}
