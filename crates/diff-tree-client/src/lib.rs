//! Source-control API client for change sets
//!
//! This crate provides a trait-based client for the changed-file endpoints
//! of a GitLab-style REST API, with optional caching. The design follows the
//! decorator pattern, allowing caching behavior to be composed with the base
//! client.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              ChangesClient trait                 │
//! │  - fetch_commit_changes()                        │
//! │  - fetch_compare()                               │
//! │  - fetch_commits()                               │
//! │  - fetch_diff_html() / fetch_file_raw()          │
//! └─────────────────────────────────────────────────┘
//!                        │
//!        ┌───────────────┴───────────────┐
//!        ▼                               ▼
//! ┌─────────────────┐         ┌─────────────────────┐
//! │  GitLabClient   │         │ CachedChangesClient │
//! │  (direct API)   │◄────────│ (decorator)         │
//! └─────────────────┘         └─────────────────────┘
//! ```
//!
//! The [`loader`] module turns API records into `diff_tree::FileChange`
//! lists, rebuilding missing comparison diffs from their HTML rendering.
//!
//! # Example
//!
//! ```rust,no_run
//! use diff_tree_client::{ApiCache, CacheMode, CachedChangesClient, GitLabClient, loader};
//! use std::sync::{Arc, Mutex};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let direct = GitLabClient::new("https://gitlab.com", None)?;
//! let cache = Arc::new(Mutex::new(ApiCache::default()));
//! let client = CachedChangesClient::new(direct, cache, CacheMode::ReadWrite);
//!
//! let files = loader::load_commit(&client, "group/project", "abc123").await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cached_client;
pub mod client;
pub mod gitlab_client;
pub mod loader;
pub mod types;

pub use cache::{ApiCache, CacheStats};
pub use cached_client::CachedChangesClient;
pub use client::{CacheMode, ChangesClient};
pub use gitlab_client::GitLabClient;
pub use types::{Commit, CompareResult};
