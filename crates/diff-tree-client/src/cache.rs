//! Response cache, persisted as JSON between runs
//!
//! Entries are keyed by endpoint kind plus project, path and ref, so the
//! same file at two refs never collides. A cache created with
//! [`ApiCache::new`] is backed by a file; [`ApiCache::default`] lives only in
//! memory.

use anyhow::Context;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Response bodies by cache key
#[derive(Debug, Default)]
pub struct ApiCache {
    entries: HashMap<String, String>,
    file: Option<PathBuf>,
    dirty: bool,
    hits: u64,
    misses: u64,
}

impl ApiCache {
    /// Open the cache stored at `file`; a missing file is an empty cache
    pub fn new(file: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let file = file.into();
        let entries = match std::fs::read_to_string(&file) {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("Corrupt cache file {}", file.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", file.display()))
            }
        };
        log::debug!(
            "Opened API cache {} with {} entries",
            file.display(),
            entries.len()
        );

        Ok(Self {
            entries,
            file: Some(file),
            ..Self::default()
        })
    }

    /// Build the cache key for a request
    pub fn key(kind: &str, project: &str, path: &str, git_ref: &str) -> String {
        format!("{}\u{1f}{}\u{1f}{}\u{1f}{}", kind, project, path, git_ref)
    }

    /// Look up a body, counting the hit or miss
    pub fn get(&mut self, key: &str) -> Option<String> {
        match self.entries.get(key) {
            Some(body) => {
                self.hits += 1;
                Some(body.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn set(&mut self, key: String, body: String) {
        self.entries.insert(key, body);
        self.dirty = true;
    }

    /// Drop every entry of a project
    pub fn invalidate_project(&mut self, project: &str) {
        let before = self.entries.len();
        self.entries
            .retain(|key, _| key.split('\u{1f}').nth(1) != Some(project));
        self.dirty |= self.entries.len() != before;
    }

    pub fn clear(&mut self) {
        self.dirty |= !self.entries.is_empty();
        self.entries.clear();
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Write changed entries back to the backing file
    pub fn save(&mut self) -> anyhow::Result<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }

        let json = serde_json::to_string(&self.entries).context("Failed to serialize cache")?;
        std::fs::write(file, json)
            .with_context(|| format!("Failed to write cache file {}", file.display()))?;
        log::debug!(
            "Saved {} cache entries to {}",
            self.entries.len(),
            file.display()
        );

        self.dirty = false;
        Ok(())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}
