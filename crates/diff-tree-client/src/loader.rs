//! Turn API records into `FileChange` lists
//!
//! Comparisons of large change sets come back with empty `diff` fields; for
//! those files the rendered HTML diff is fetched and converted back into
//! unified diff text. A failed fetch leaves the file without a diff.

use crate::client::ChangesClient;
use diff_tree::{extract_diff_from_html, FileChange, RawChange};
use log::{debug, warn};

/// Changed files of a single commit
pub async fn load_commit<C>(client: &C, project: &str, sha: &str) -> anyhow::Result<Vec<FileChange>>
where
    C: ChangesClient + ?Sized,
{
    let records = client.fetch_commit_changes(project, sha).await?;
    debug!("Loaded {} changes for {} @ {}", records.len(), project, sha);
    Ok(FileChange::from_raw_list(&records, Some(sha)))
}

/// Changed files between two refs, with missing diffs rebuilt from HTML
pub async fn load_compare<C>(
    client: &C,
    project: &str,
    from: &str,
    to: &str,
) -> anyhow::Result<Vec<FileChange>>
where
    C: ChangesClient + ?Sized,
{
    let result = client.fetch_compare(project, from, to).await?;
    debug!(
        "Compared {}...{} in {}: {} commits, {} files",
        from,
        to,
        project,
        result.commits.len(),
        result.diffs.len()
    );

    let mut files = Vec::with_capacity(result.diffs.len());
    for raw in &result.diffs {
        let Some(file) = FileChange::from_raw(raw, Some(to)) else {
            continue;
        };
        files.push(fill_missing_diff(client, project, from, to, raw, file).await);
    }

    Ok(files)
}

async fn fill_missing_diff<C>(
    client: &C,
    project: &str,
    from: &str,
    to: &str,
    raw: &RawChange,
    file: FileChange,
) -> FileChange
where
    C: ChangesClient + ?Sized,
{
    if !raw.diff.is_empty() {
        return file;
    }

    match client
        .fetch_diff_html(project, &file.path, &file.old_path, from, to)
        .await
    {
        Ok(html) => {
            let diff = extract_diff_from_html(&html);
            debug!(
                "Rebuilt diff for {} from HTML ({} bytes)",
                file.path,
                diff.len()
            );
            file.with_diff_text(Some(diff))
        }
        Err(e) => {
            warn!("Failed to fetch HTML diff for {}: {:#}", file.path, e);
            file
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Commit, CompareResult};
    use async_trait::async_trait;
    use diff_tree::FileStatus;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Default)]
    struct MockClient {
        diffs: Vec<RawChange>,
        html: Option<String>,
        html_requests: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ChangesClient for MockClient {
        async fn fetch_commit_changes(
            &self,
            _project: &str,
            _sha: &str,
        ) -> anyhow::Result<Vec<RawChange>> {
            Ok(self.diffs.clone())
        }

        async fn fetch_compare(
            &self,
            _project: &str,
            _from: &str,
            _to: &str,
        ) -> anyhow::Result<CompareResult> {
            Ok(CompareResult {
                diffs: self.diffs.clone(),
                ..CompareResult::default()
            })
        }

        async fn fetch_commits(
            &self,
            _project: &str,
            _ref_name: &str,
        ) -> anyhow::Result<Vec<Commit>> {
            Ok(vec![])
        }

        async fn fetch_diff_html(
            &self,
            _project: &str,
            path: &str,
            _old_path: &str,
            _from: &str,
            _to: &str,
        ) -> anyhow::Result<String> {
            self.html_requests.lock().unwrap().push(path.to_string());
            self.html
                .clone()
                .ok_or_else(|| anyhow::anyhow!("diff_for_path returned 404"))
        }

        async fn fetch_file_raw(
            &self,
            _project: &str,
            _path: &str,
            _git_ref: &str,
        ) -> anyhow::Result<String> {
            Ok(String::new())
        }
    }

    fn record(path: &str, diff: &str) -> RawChange {
        RawChange {
            old_path: path.to_string(),
            new_path: path.to_string(),
            diff: diff.to_string(),
            ..RawChange::default()
        }
    }

    #[tokio::test]
    async fn test_load_commit() {
        let client = MockClient {
            diffs: vec![
                record("src/lib.rs", "@@ -1 +1 @@\n-a\n+b\n"),
                RawChange {
                    new_path: "new.txt".to_string(),
                    new_file: true,
                    ..RawChange::default()
                },
                RawChange::default(),
            ],
            ..MockClient::default()
        };

        let files = load_commit(&client, "g/p", "abc123").await.unwrap();
        assert_eq!(files.len(), 2, "record without paths is dropped");
        assert_eq!(files[0].git_ref.as_deref(), Some("abc123"));
        assert!(files[0].has_diff);
        assert_eq!(files[1].status, FileStatus::Added);
        assert!(!files[1].has_diff);
    }

    #[tokio::test]
    async fn test_load_compare_rebuilds_missing_diffs() {
        let client = MockClient {
            diffs: vec![
                record("kept.rs", "@@ -1 +1 @@\n-a\n+b\n"),
                record("big.rs", ""),
            ],
            html: Some(
                r#"<tr class="line_holder new" data-new-line="1"><td class="line_content">hello</td></tr>"#
                    .to_string(),
            ),
            ..MockClient::default()
        };

        let files = load_compare(&client, "g/p", "main", "dev").await.unwrap();

        assert_eq!(*client.html_requests.lock().unwrap(), vec!["big.rs"]);
        assert_eq!(
            files[0].diff_text.as_deref(),
            Some("@@ -1 +1 @@\n-a\n+b\n")
        );
        assert_eq!(
            files[1].diff_text.as_deref(),
            Some("@@ -1,0 +1,1 @@\n+hello")
        );
        assert_eq!(files[1].git_ref.as_deref(), Some("dev"));
    }

    #[tokio::test]
    async fn test_load_compare_tolerates_html_failure() {
        let client = MockClient {
            diffs: vec![record("big.rs", "")],
            html: None,
            ..MockClient::default()
        };

        let files = load_compare(&client, "g/p", "main", "dev").await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].diff_text, None);
        assert!(!files[0].has_diff);
    }

    #[tokio::test]
    async fn test_load_compare_empty_extraction_keeps_no_diff() {
        let client = MockClient {
            diffs: vec![record("image.png", "")],
            html: Some("<div class=\"nothing-here\"></div>".to_string()),
            ..MockClient::default()
        };

        let files = load_compare(&client, "g/p", "main", "dev").await.unwrap();
        assert_eq!(files[0].diff_text, None);
    }
}
