//! Client trait and cache mode definitions
//!
//! This module defines the `ChangesClient` trait that all client
//! implementations must satisfy, and the `CacheMode` enum controlling the
//! caching decorator.

use crate::types::{Commit, CompareResult};
use async_trait::async_trait;
use diff_tree::RawChange;

/// Cache behavior mode for API clients
///
/// Set at client construction time, not per request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Neither read nor write
    None,

    /// Skip cache reads but store responses ("force refresh")
    WriteOnly,

    /// Read from cache, never update it (offline browsing)
    ReadOnly,

    /// Read and write
    #[default]
    ReadWrite,
}

impl CacheMode {
    /// Should we attempt to read from cache before making the API call?
    pub fn should_read(&self) -> bool {
        matches!(self, CacheMode::ReadOnly | CacheMode::ReadWrite)
    }

    /// Should we write API responses to cache?
    pub fn should_write(&self) -> bool {
        matches!(self, CacheMode::WriteOnly | CacheMode::ReadWrite)
    }
}

/// Source-control API client for change sets
///
/// `project` is the full project path (`group/subgroup/repo`); encoding it
/// for the URL is the implementation's job.
///
/// # Example
///
/// ```rust,ignore
/// use diff_tree_client::ChangesClient;
///
/// async fn changed_paths(client: &dyn ChangesClient) -> anyhow::Result<Vec<String>> {
///     let records = client.fetch_commit_changes("group/project", "abc123").await?;
///     Ok(records.into_iter().map(|r| r.new_path).collect())
/// }
/// ```
#[async_trait]
pub trait ChangesClient: Send + Sync {
    /// Fetch the changed files of a single commit
    async fn fetch_commit_changes(&self, project: &str, sha: &str)
        -> anyhow::Result<Vec<RawChange>>;

    /// Compare two refs (branches, tags or SHAs)
    ///
    /// Records in the result may carry an empty `diff`; see
    /// [`fetch_diff_html`](Self::fetch_diff_html).
    async fn fetch_compare(
        &self,
        project: &str,
        from: &str,
        to: &str,
    ) -> anyhow::Result<CompareResult>;

    /// Fetch the commit history of a ref, newest first
    async fn fetch_commits(&self, project: &str, ref_name: &str) -> anyhow::Result<Vec<Commit>>;

    /// Fetch the rendered HTML diff of one file in a comparison
    async fn fetch_diff_html(
        &self,
        project: &str,
        path: &str,
        old_path: &str,
        from: &str,
        to: &str,
    ) -> anyhow::Result<String>;

    /// Fetch raw file content at a ref
    async fn fetch_file_raw(&self, project: &str, path: &str, git_ref: &str)
        -> anyhow::Result<String>;
}
