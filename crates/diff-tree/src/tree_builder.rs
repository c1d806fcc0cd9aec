//! Build the folder tree for a change set.

use crate::model::{DiffStats, FileChange, FileNode, FileStatus, FolderNode, TreeNode, ROOT_NAME};
use crate::parser::parse_stats;

/// Build a file tree from a flat list of changes.
///
/// Each path is split on `/`; intermediate segments become folders, the last
/// one a file carrying the full change. Folder stats are the sums of their
/// files. Folder status is a display hint: the first status placed below a
/// folder wins, except that `modified` always overwrites. Chains of
/// single-folder folders are collapsed into one `a/b/c` node afterwards.
pub fn build_file_tree(files: &[FileChange]) -> TreeNode {
    let mut root = FolderNode::new(ROOT_NAME);

    for file in files {
        let segments: Vec<&str> = file.path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            log::debug!("Skipping change with empty path: {:?}", file.path);
            continue;
        }

        let stats = parse_stats(file.diff_text.as_deref());
        insert_file(&mut root, &segments, file, stats, true);
    }

    TreeNode::Folder(collapse_children(root))
}

/// Insert `file` below `folder`, returning the (added, withdrawn) stats that
/// were applied to `folder`. Withdrawn stats belong to a node that was
/// overwritten.
fn insert_file(
    folder: &mut FolderNode,
    segments: &[&str],
    file: &FileChange,
    stats: DiffStats,
    is_root: bool,
) -> (DiffStats, DiffStats) {
    if !is_root && (folder.status.is_none() || file.status == FileStatus::Modified) {
        folder.status = Some(file.status);
    }

    let (added, withdrawn) = match segments {
        [] => (DiffStats::default(), DiffStats::default()),
        [name] => {
            let node = TreeNode::File(FileNode::from_change(*name, file, stats));
            let replaced = folder.children.insert((*name).to_string(), node);
            (stats, replaced.map(|n| n.stats()).unwrap_or_default())
        }
        [name, rest @ ..] => {
            let child = folder
                .children
                .entry((*name).to_string())
                .or_insert_with(|| TreeNode::Folder(FolderNode::new(*name)));

            // A file sitting where a folder is needed gets replaced.
            let replaced = match &*child {
                TreeNode::File(existing) => existing.stats,
                TreeNode::Folder(_) => DiffStats::default(),
            };
            if !child.is_folder() {
                *child = TreeNode::Folder(FolderNode::new(*name));
            }

            match child {
                TreeNode::Folder(sub) => {
                    let (added, withdrawn) = insert_file(sub, rest, file, stats, false);
                    (added, withdrawn + replaced)
                }
                TreeNode::File(_) => (DiffStats::default(), replaced),
            }
        }
    };

    folder.stats += added;
    folder.stats -= withdrawn;
    (added, withdrawn)
}

/// Collapse single-folder chains below `folder`, bottom-up. The folder
/// itself is never merged into its child.
fn collapse_children(mut folder: FolderNode) -> FolderNode {
    folder.children = std::mem::take(&mut folder.children)
        .into_values()
        .map(|child| match child {
            TreeNode::Folder(sub) => {
                let collapsed = merge_single_folder_child(collapse_children(sub));
                (collapsed.name.clone(), TreeNode::Folder(collapsed))
            }
            TreeNode::File(file) => (file.name.clone(), TreeNode::File(file)),
        })
        .collect();
    folder
}

/// Merge a folder whose only child is a folder into that child, naming the
/// result `parent/child`. The child is already collapsed, so one merge is
/// enough.
fn merge_single_folder_child(mut folder: FolderNode) -> FolderNode {
    if folder.children.len() != 1 {
        return folder;
    }

    match folder.children.pop_first() {
        Some((_, TreeNode::Folder(child))) => FolderNode {
            name: format!("{}/{}", folder.name, child.name),
            ..child
        },
        Some((key, file)) => {
            folder.children.insert(key, file);
            folder
        }
        None => folder,
    }
}
