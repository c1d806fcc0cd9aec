//! Cached changes client (decorator pattern)
//!
//! Wraps any `ChangesClient` implementation to add caching behavior.
//! The cache mode determines whether to read from cache, write to cache, or both.

use crate::cache::{ApiCache, CacheStats};
use crate::client::{CacheMode, ChangesClient};
use crate::types::{Commit, CompareResult};
use async_trait::async_trait;
use diff_tree::RawChange;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Cached changes client using the decorator pattern
///
/// Wraps an inner `ChangesClient` and stores its responses as JSON in a
/// shared [`ApiCache`]. Commits are immutable, so a cached change list never
/// goes stale; branch comparisons can, which is what `CacheMode::WriteOnly`
/// is for.
///
/// # Cache Modes
///
/// - `CacheMode::None` - Pass through to inner client (no caching)
/// - `CacheMode::WriteOnly` - Skip cache reads, but write responses (force refresh)
/// - `CacheMode::ReadOnly` - Read from cache only, don't update cache
/// - `CacheMode::ReadWrite` - Full caching (default)
#[derive(Debug, Clone)]
pub struct CachedChangesClient<C: ChangesClient + Clone> {
    inner: C,
    cache: Arc<Mutex<ApiCache>>,
    mode: CacheMode,
}

impl<C: ChangesClient + Clone> CachedChangesClient<C> {
    /// Create a new cached client
    ///
    /// # Arguments
    ///
    /// * `inner` - The inner client to delegate API calls to
    /// * `cache` - Shared cache instance
    /// * `mode` - Cache behavior mode
    pub fn new(inner: C, cache: Arc<Mutex<ApiCache>>, mode: CacheMode) -> Self {
        Self { inner, cache, mode }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.lock().unwrap().stats()
    }

    /// Persist the shared cache, unless this client never writes to it
    pub fn save_cache(&self) -> anyhow::Result<()> {
        if !self.mode.should_write() {
            return Ok(());
        }
        self.cache.lock().unwrap().save()
    }

    /// Forget everything cached for a project
    pub fn invalidate_project(&self, project: &str) {
        debug!("Cache invalidation for project '{}'", project);
        self.cache.lock().unwrap().invalidate_project(project);
    }

    fn try_cache_get(&self, key: &str) -> Option<String> {
        if !self.mode.should_read() {
            return None;
        }

        let mut cache = self.cache.lock().unwrap();
        cache.get(key)
    }

    fn cache_set(&self, key: String, body: String) {
        if !self.mode.should_write() {
            return;
        }

        let mut cache = self.cache.lock().unwrap();
        cache.set(key, body);
    }

    /// Serve `key` from cache, or await `fetch` and store its result
    async fn cached<T, F>(&self, key: String, fetch: F) -> anyhow::Result<T>
    where
        T: Serialize + DeserializeOwned + Send,
        F: Future<Output = anyhow::Result<T>> + Send,
    {
        if let Some(cached_body) = self.try_cache_get(&key) {
            match serde_json::from_str::<T>(&cached_body) {
                Ok(value) => {
                    debug!("Cache HIT for {}", key.replace('\u{1f}', " "));
                    return Ok(value);
                }
                Err(e) => {
                    debug!("Failed to parse cached response: {}", e);
                }
            }
        }

        debug!("Cache MISS for {}", key.replace('\u{1f}', " "));
        let value = fetch.await?;

        match serde_json::to_string(&value) {
            Ok(json) => self.cache_set(key, json),
            Err(e) => debug!("Failed to serialize response for cache: {}", e),
        }

        Ok(value)
    }
}

#[async_trait]
impl<C: ChangesClient + Clone> ChangesClient for CachedChangesClient<C> {
    async fn fetch_commit_changes(
        &self,
        project: &str,
        sha: &str,
    ) -> anyhow::Result<Vec<RawChange>> {
        let key = ApiCache::key("commit_diff", project, "", sha);
        self.cached(key, self.inner.fetch_commit_changes(project, sha))
            .await
    }

    async fn fetch_compare(
        &self,
        project: &str,
        from: &str,
        to: &str,
    ) -> anyhow::Result<CompareResult> {
        let key = ApiCache::key("compare", project, "", &format!("{}...{}", from, to));
        self.cached(key, self.inner.fetch_compare(project, from, to))
            .await
    }

    async fn fetch_commits(&self, project: &str, ref_name: &str) -> anyhow::Result<Vec<Commit>> {
        let key = ApiCache::key("commits", project, "", ref_name);
        self.cached(key, self.inner.fetch_commits(project, ref_name))
            .await
    }

    async fn fetch_diff_html(
        &self,
        project: &str,
        path: &str,
        old_path: &str,
        from: &str,
        to: &str,
    ) -> anyhow::Result<String> {
        let key = ApiCache::key(
            "diff_html",
            project,
            &format!("{}:{}", old_path, path),
            &format!("{}...{}", from, to),
        );
        self.cached(
            key,
            self.inner.fetch_diff_html(project, path, old_path, from, to),
        )
        .await
    }

    async fn fetch_file_raw(
        &self,
        project: &str,
        path: &str,
        git_ref: &str,
    ) -> anyhow::Result<String> {
        let key = ApiCache::key("raw", project, path, git_ref);
        self.cached(key, self.inner.fetch_file_raw(project, path, git_ref))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    /// Mock client for testing
    #[derive(Debug, Clone)]
    struct MockClient {
        changes: Vec<RawChange>,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockClient {
        fn new(changes: Vec<RawChange>) -> Self {
            Self {
                changes,
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl ChangesClient for MockClient {
        async fn fetch_commit_changes(
            &self,
            _project: &str,
            _sha: &str,
        ) -> anyhow::Result<Vec<RawChange>> {
            *self.call_count.lock().unwrap() += 1;
            Ok(self.changes.clone())
        }

        async fn fetch_compare(
            &self,
            _project: &str,
            _from: &str,
            _to: &str,
        ) -> anyhow::Result<CompareResult> {
            *self.call_count.lock().unwrap() += 1;
            Ok(CompareResult {
                diffs: self.changes.clone(),
                ..CompareResult::default()
            })
        }

        async fn fetch_commits(
            &self,
            _project: &str,
            _ref_name: &str,
        ) -> anyhow::Result<Vec<Commit>> {
            *self.call_count.lock().unwrap() += 1;
            Ok(vec![Commit {
                id: "abc123def".to_string(),
                short_id: "abc123d".to_string(),
                title: "Initial commit".to_string(),
                author_name: "Dev".to_string(),
                committed_date: Utc::now(),
            }])
        }

        async fn fetch_diff_html(
            &self,
            _project: &str,
            _path: &str,
            _old_path: &str,
            _from: &str,
            _to: &str,
        ) -> anyhow::Result<String> {
            *self.call_count.lock().unwrap() += 1;
            Ok("<table></table>".to_string())
        }

        async fn fetch_file_raw(
            &self,
            _project: &str,
            path: &str,
            git_ref: &str,
        ) -> anyhow::Result<String> {
            *self.call_count.lock().unwrap() += 1;
            Ok(format!("{}@{}", path, git_ref))
        }
    }

    fn change(path: &str) -> RawChange {
        RawChange {
            old_path: path.to_string(),
            new_path: path.to_string(),
            diff: "@@ -1 +1 @@\n-a\n+b\n".to_string(),
            ..RawChange::default()
        }
    }

    fn client(mode: CacheMode) -> (CachedChangesClient<MockClient>, MockClient) {
        let mock = MockClient::new(vec![change("src/lib.rs")]);
        let cache = Arc::new(Mutex::new(ApiCache::default()));
        (
            CachedChangesClient::new(mock.clone(), cache, mode),
            mock,
        )
    }

    fn cache_file(name: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "difftree-cached-client-{}-{}.json",
            std::process::id(),
            name
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[tokio::test]
    async fn test_read_write_mode_caches() {
        let (client, mock) = client(CacheMode::ReadWrite);

        let first = client.fetch_commit_changes("g/p", "abc").await.unwrap();
        assert_eq!(mock.call_count(), 1);

        let second = client.fetch_commit_changes("g/p", "abc").await.unwrap();
        assert_eq!(mock.call_count(), 1, "second call should hit cache");
        assert_eq!(first, second);

        assert_eq!(client.cache_stats().hits, 1);
    }

    #[tokio::test]
    async fn test_none_mode_bypasses_cache() {
        let (client, mock) = client(CacheMode::None);

        client.fetch_commit_changes("g/p", "abc").await.unwrap();
        client.fetch_commit_changes("g/p", "abc").await.unwrap();
        assert_eq!(mock.call_count(), 2);
        assert_eq!(client.cache_stats().entries, 0);
    }

    #[tokio::test]
    async fn test_write_only_mode_refreshes() {
        let mock = MockClient::new(vec![]);
        let cache = Arc::new(Mutex::new(ApiCache::default()));
        let client = CachedChangesClient::new(mock.clone(), Arc::clone(&cache), CacheMode::WriteOnly);

        client.fetch_commits("g/p", "main").await.unwrap();
        client.fetch_commits("g/p", "main").await.unwrap();
        assert_eq!(mock.call_count(), 2, "write-only never reads");

        // A read-write client over the same cache sees the stored response
        let reader = CachedChangesClient::new(mock.clone(), cache, CacheMode::ReadWrite);
        reader.fetch_commits("g/p", "main").await.unwrap();
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_saved_cache_serves_next_run() {
        let file = cache_file("next-run");

        let first_run = MockClient::new(vec![change("src/lib.rs")]);
        let cache = Arc::new(Mutex::new(ApiCache::new(&file).unwrap()));
        let client = CachedChangesClient::new(first_run.clone(), cache, CacheMode::ReadWrite);
        let fetched = client.fetch_compare("g/p", "main", "dev").await.unwrap();
        client.save_cache().unwrap();
        assert_eq!(first_run.call_count(), 1);

        let second_run = MockClient::new(vec![]);
        let cache = Arc::new(Mutex::new(ApiCache::new(&file).unwrap()));
        let client = CachedChangesClient::new(second_run.clone(), cache, CacheMode::ReadWrite);
        let cached = client.fetch_compare("g/p", "main", "dev").await.unwrap();

        assert_eq!(second_run.call_count(), 0);
        assert_eq!(cached, fetched);

        let _ = std::fs::remove_file(&file);
    }

    #[tokio::test]
    async fn test_read_only_client_does_not_save() {
        let file = cache_file("read-only");
        let mock = MockClient::new(vec![]);
        let cache = Arc::new(Mutex::new(ApiCache::new(&file).unwrap()));
        cache
            .lock()
            .unwrap()
            .set(ApiCache::key("raw", "g/p", "a.rs", "main"), "\"x\"".to_string());

        let client = CachedChangesClient::new(mock, cache, CacheMode::ReadOnly);
        client.save_cache().unwrap();
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn test_read_only_mode_does_not_store() {
        let (client, mock) = client(CacheMode::ReadOnly);

        client.fetch_file_raw("g/p", "a.rs", "main").await.unwrap();
        client.fetch_file_raw("g/p", "a.rs", "main").await.unwrap();
        assert_eq!(mock.call_count(), 2);
        assert_eq!(client.cache_stats().entries, 0);
    }

    #[tokio::test]
    async fn test_keys_include_ref_and_path() {
        let (client, mock) = client(CacheMode::ReadWrite);

        let a = client.fetch_file_raw("g/p", "a.rs", "v1").await.unwrap();
        let b = client.fetch_file_raw("g/p", "a.rs", "v2").await.unwrap();
        let c = client.fetch_file_raw("g/p", "b.rs", "v1").await.unwrap();

        assert_eq!(mock.call_count(), 3);
        assert_eq!(a, "a.rs@v1");
        assert_eq!(b, "a.rs@v2");
        assert_eq!(c, "b.rs@v1");
    }

    #[tokio::test]
    async fn test_invalidate_project() {
        let (client, mock) = client(CacheMode::ReadWrite);

        client.fetch_compare("g/p", "main", "dev").await.unwrap();
        client.invalidate_project("g/p");
        client.fetch_compare("g/p", "main", "dev").await.unwrap();
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_string_responses_round_trip_through_cache() {
        let (client, mock) = client(CacheMode::ReadWrite);

        let first = client
            .fetch_diff_html("g/p", "a.rs", "a.rs", "main", "dev")
            .await
            .unwrap();
        let second = client
            .fetch_diff_html("g/p", "a.rs", "a.rs", "main", "dev")
            .await
            .unwrap();

        assert_eq!(mock.call_count(), 1);
        assert_eq!(first, second);
    }
}
