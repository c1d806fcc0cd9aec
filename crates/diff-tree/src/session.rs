//! Per-panel view context.
//!
//! Everything a panel needs to show a change set (project, ref, view mode
//! and the highlighting collaborators) travels in a [`ViewSession`], so
//! several panels can be open side by side without sharing state.

use crate::highlight::SyntectHighlighter;
use crate::model::{FileChange, FileNode, FlatEntry, RenderedDiff, TreeNode};
use crate::parser::render_diff;
use crate::traits::{SyntaxHighlighter, WordDiffer};
use crate::tree_builder::build_file_tree;
use crate::word_diff::SimilarWordDiffer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How the change set is listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Nested folders with tree guides.
    #[default]
    Tree,
    /// One row per file, full paths, sorted.
    List,
}

/// View context for one change-set panel.
#[derive(Clone)]
pub struct ViewSession {
    /// Project the changes belong to (e.g. `group/repo`).
    pub project: String,
    /// Ref the change set was loaded for.
    pub git_ref: Option<String>,
    pub view_mode: ViewMode,
    highlighter: Arc<dyn SyntaxHighlighter>,
    word_differ: Arc<dyn WordDiffer>,
}

impl std::fmt::Debug for ViewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewSession")
            .field("project", &self.project)
            .field("git_ref", &self.git_ref)
            .field("view_mode", &self.view_mode)
            .finish()
    }
}

impl ViewSession {
    /// Create a session with explicit collaborators.
    pub fn new(
        project: impl Into<String>,
        highlighter: Arc<dyn SyntaxHighlighter>,
        word_differ: Arc<dyn WordDiffer>,
    ) -> Self {
        Self {
            project: project.into(),
            git_ref: None,
            view_mode: ViewMode::default(),
            highlighter,
            word_differ,
        }
    }

    /// Create a session using syntect and `similar` with the given theme.
    pub fn with_theme(project: impl Into<String>, theme_name: &str) -> Self {
        Self::new(
            project,
            Arc::new(SyntectHighlighter::with_theme_name(theme_name)),
            Arc::new(SimilarWordDiffer),
        )
    }

    pub fn with_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }

    pub fn with_view_mode(mut self, view_mode: ViewMode) -> Self {
        self.view_mode = view_mode;
        self
    }

    /// Build the tree for a freshly loaded change set.
    pub fn build_tree(&self, files: &[FileChange]) -> TreeNode {
        log::debug!(
            "Building tree for {} files in {} @ {}",
            files.len(),
            self.project,
            self.git_ref.as_deref().unwrap_or("-")
        );
        build_file_tree(files)
    }

    /// Display rows for the current view mode.
    pub fn rows(&self, tree: &TreeNode) -> Vec<FlatEntry> {
        match self.view_mode {
            ViewMode::Tree => tree.flatten(),
            ViewMode::List => list_rows(tree),
        }
    }

    /// Render one file's diff.
    pub fn render_file(&self, file: &FileNode) -> RenderedDiff {
        render_diff(
            file.diff_text.as_deref(),
            &file.path,
            self.highlighter.as_ref(),
            self.word_differ.as_ref(),
        )
    }

    /// Render the diff of the file at `path`, if the tree holds it.
    pub fn render_path(&self, tree: &TreeNode, path: &str) -> Option<RenderedDiff> {
        tree.find_file(path).map(|file| self.render_file(file))
    }
}

fn list_rows(tree: &TreeNode) -> Vec<FlatEntry> {
    let mut files = Vec::new();
    collect_files(tree, &mut files);
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let count = files.len();
    files
        .into_iter()
        .enumerate()
        .map(|(i, file)| FlatEntry {
            depth: 0,
            name: file.path.clone(),
            path: Some(file.path.clone()),
            is_dir: false,
            status: Some(file.status),
            stats: file.stats,
            is_last: i + 1 == count,
            ancestor_has_next: Vec::new(),
        })
        .collect()
}

fn collect_files<'a>(node: &'a TreeNode, out: &mut Vec<&'a FileNode>) {
    match node {
        TreeNode::File(file) => out.push(file),
        TreeNode::Folder(folder) => {
            for child in folder.children.values() {
                collect_files(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::PlainTextHighlighter;
    use pretty_assertions::assert_eq;

    fn session() -> ViewSession {
        ViewSession::new(
            "group/project",
            Arc::new(PlainTextHighlighter),
            Arc::new(SimilarWordDiffer),
        )
        .with_ref("main")
    }

    fn files() -> Vec<FileChange> {
        vec![
            FileChange::new("src/main.rs", Some("@@ -1 +1 @@\n-a\n+b\n".to_string())),
            FileChange::new("README.md", None),
            FileChange::new("src/util/io.rs", Some("@@ -1 +1,2 @@\n x\n+y\n".to_string())),
        ]
    }

    #[test]
    fn test_tree_rows() {
        let session = session();
        let tree = session.build_tree(&files());
        let names: Vec<_> = session.rows(&tree).into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["src", "util", "io.rs", "main.rs", "README.md"]);
    }

    #[test]
    fn test_list_rows() {
        let session = session().with_view_mode(ViewMode::List);
        let tree = session.build_tree(&files());
        let rows = session.rows(&tree);

        let names: Vec<_> = rows.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["README.md", "src/main.rs", "src/util/io.rs"]);
        assert!(rows.iter().all(|e| e.depth == 0 && !e.is_dir));
        assert!(rows[2].is_last);
    }

    #[test]
    fn test_render_path() {
        let session = session();
        let tree = session.build_tree(&files());

        let rendered = session.render_path(&tree, "src/main.rs").unwrap();
        assert_eq!(rendered.lines().count(), 2);

        assert!(session.render_path(&tree, "README.md").unwrap().is_empty());
        assert!(session.render_path(&tree, "missing.rs").is_none());
    }

    #[test]
    fn test_independent_sessions() {
        let a = session();
        let b = session().with_view_mode(ViewMode::List);
        let files = files();

        assert_eq!(a.build_tree(&files), b.build_tree(&files));
        assert_ne!(a.rows(&a.build_tree(&files)), b.rows(&b.build_tree(&files)));
    }
}
