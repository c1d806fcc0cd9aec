//! Changed-file records as delivered by the remote API and their immutable
//! in-memory form.

use serde::{Deserialize, Serialize};

/// A change record exactly as the remote API returns it.
///
/// GitLab-style: commit diffs, comparisons and merge request changes all
/// share this shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChange {
    /// Path after the change (empty for some deleted-file payloads).
    #[serde(default)]
    pub new_path: String,
    /// Path before the change.
    #[serde(default)]
    pub old_path: String,
    #[serde(default)]
    pub new_file: bool,
    #[serde(default)]
    pub deleted_file: bool,
    #[serde(default)]
    pub renamed_file: bool,
    /// Unified diff text, possibly empty (too large, binary, or omitted).
    #[serde(default)]
    pub diff: String,
}

/// File status in the change set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl FileStatus {
    /// Get a single-character representation.
    pub fn as_char(&self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Modified => 'M',
            FileStatus::Deleted => 'D',
            FileStatus::Renamed => 'R',
        }
    }

    /// CSS-friendly lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Added => "added",
            FileStatus::Modified => "modified",
            FileStatus::Deleted => "deleted",
            FileStatus::Renamed => "renamed",
        }
    }
}

/// One changed file, built once from a [`RawChange`] and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Current path (after rename if applicable).
    pub path: String,
    /// Previous path (equal to `path` unless renamed).
    pub old_path: String,
    pub status: FileStatus,
    /// Unified diff text, `None` when the API delivered none.
    pub diff_text: Option<String>,
    pub has_diff: bool,
    /// Ref the file content can be fetched at (commit SHA or branch).
    pub git_ref: Option<String>,
}

impl FileChange {
    /// Create a modified file change with the given diff text.
    pub fn new(path: impl Into<String>, diff_text: Option<String>) -> Self {
        let path = path.into();
        let diff_text = diff_text.filter(|d| !d.is_empty());
        Self {
            old_path: path.clone(),
            path,
            status: FileStatus::Modified,
            has_diff: diff_text.is_some(),
            diff_text,
            git_ref: None,
        }
    }

    /// Set the status.
    pub fn with_status(mut self, status: FileStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the ref the file lives at.
    pub fn with_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }

    /// Replace the diff text (used when the diff is reconstructed from HTML).
    pub fn with_diff_text(mut self, diff_text: Option<String>) -> Self {
        self.diff_text = diff_text.filter(|d| !d.is_empty());
        self.has_diff = self.diff_text.is_some();
        self
    }

    /// Convert an API record.
    ///
    /// Returns `None` for records carrying neither a new nor an old path.
    pub fn from_raw(raw: &RawChange, git_ref: Option<&str>) -> Option<Self> {
        let path = if !raw.new_path.is_empty() {
            raw.new_path.clone()
        } else if !raw.old_path.is_empty() {
            raw.old_path.clone()
        } else {
            return None;
        };

        let old_path = if raw.old_path.is_empty() {
            path.clone()
        } else {
            raw.old_path.clone()
        };

        let status = if raw.new_file {
            FileStatus::Added
        } else if raw.deleted_file {
            FileStatus::Deleted
        } else if raw.renamed_file {
            FileStatus::Renamed
        } else {
            FileStatus::Modified
        };

        let diff_text = (!raw.diff.is_empty()).then(|| raw.diff.clone());

        Some(Self {
            path,
            old_path,
            status,
            has_diff: diff_text.is_some(),
            diff_text,
            git_ref: git_ref.map(str::to_string),
        })
    }

    /// Convert a batch of API records, skipping the ones without a path.
    pub fn from_raw_list(records: &[RawChange], git_ref: Option<&str>) -> Vec<Self> {
        records
            .iter()
            .filter_map(|raw| Self::from_raw(raw, git_ref))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(new_path: &str, old_path: &str) -> RawChange {
        RawChange {
            new_path: new_path.to_string(),
            old_path: old_path.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_from_flags() {
        let mut record = raw("a.rs", "a.rs");
        assert_eq!(
            FileChange::from_raw(&record, None).unwrap().status,
            FileStatus::Modified
        );

        record.new_file = true;
        assert_eq!(
            FileChange::from_raw(&record, None).unwrap().status,
            FileStatus::Added
        );

        record.new_file = false;
        record.deleted_file = true;
        assert_eq!(
            FileChange::from_raw(&record, None).unwrap().status,
            FileStatus::Deleted
        );

        record.deleted_file = false;
        record.renamed_file = true;
        assert_eq!(
            FileChange::from_raw(&record, None).unwrap().status,
            FileStatus::Renamed
        );
    }

    #[test]
    fn test_path_falls_back_to_old_path() {
        let change = FileChange::from_raw(&raw("", "gone.txt"), Some("abc")).unwrap();
        assert_eq!(change.path, "gone.txt");
        assert_eq!(change.git_ref.as_deref(), Some("abc"));
    }

    #[test]
    fn test_record_without_paths_is_skipped() {
        assert!(FileChange::from_raw(&raw("", ""), None).is_none());
        let list = FileChange::from_raw_list(&[raw("", ""), raw("x.rs", "x.rs")], None);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_empty_diff_means_no_diff() {
        let change = FileChange::from_raw(&raw("x.rs", "x.rs"), None).unwrap();
        assert!(!change.has_diff);
        assert!(change.diff_text.is_none());

        let mut record = raw("x.rs", "x.rs");
        record.diff = "@@ -1 +1 @@\n-a\n+b\n".to_string();
        let change = FileChange::from_raw(&record, None).unwrap();
        assert!(change.has_diff);
    }

    #[test]
    fn test_deserialize_api_record() {
        let json = r#"{
            "old_path": "src/old.rs",
            "new_path": "src/new.rs",
            "a_mode": "100644",
            "b_mode": "100644",
            "new_file": false,
            "renamed_file": true,
            "deleted_file": false,
            "diff": "@@ -1 +1 @@\n-a\n+b\n"
        }"#;
        let record: RawChange = serde_json::from_str(json).unwrap();
        let change = FileChange::from_raw(&record, None).unwrap();
        assert_eq!(change.status, FileStatus::Renamed);
        assert_eq!(change.old_path, "src/old.rs");
        assert_eq!(change.path, "src/new.rs");
    }
}
