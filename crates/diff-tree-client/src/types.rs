//! API data transfer objects
//!
//! Change records themselves are `diff_tree::RawChange`; these are the
//! envelopes around them.

use chrono::{DateTime, Utc};
use diff_tree::RawChange;
use serde::{Deserialize, Serialize};

/// A commit from the repository history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Full commit SHA
    pub id: String,

    /// Abbreviated SHA
    #[serde(default)]
    pub short_id: String,

    /// First line of the commit message
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub author_name: String,

    pub committed_date: DateTime<Utc>,
}

/// Result of comparing two refs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareResult {
    /// Commits between `from` and `to`
    #[serde(default)]
    pub commits: Vec<Commit>,

    /// Changed files
    #[serde(default)]
    pub diffs: Vec<RawChange>,

    /// Whether both refs point at the same commit
    #[serde(default)]
    pub compare_same_ref: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_compare() {
        let json = r#"{
            "commit": null,
            "commits": [{
                "id": "12d65c8dd2b2676fa3ac47d955accc085a37a9c1",
                "short_id": "12d65c8d",
                "title": "JS fix",
                "author_name": "Example User",
                "committed_date": "2014-02-27T10:27:00+02:00"
            }],
            "diffs": [{
                "old_path": "files/js/application.js",
                "new_path": "files/js/application.js",
                "new_file": false,
                "renamed_file": false,
                "deleted_file": false,
                "diff": ""
            }],
            "compare_timeout": false,
            "compare_same_ref": false
        }"#;

        let result: CompareResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.commits.len(), 1);
        assert_eq!(result.commits[0].short_id, "12d65c8d");
        assert_eq!(
            result.commits[0].committed_date.to_rfc3339(),
            "2014-02-27T08:27:00+00:00"
        );
        assert_eq!(result.diffs[0].new_path, "files/js/application.js");
        assert!(result.diffs[0].diff.is_empty());
    }
}
