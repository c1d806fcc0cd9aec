//! Application configuration
//!
//! Looked up as `.diff-tree.toml` in the working directory, then in `$HOME`,
//! then as `config.toml` in the config directory. The first file found wins.

use diff_tree::ViewMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const LOCAL_CONFIG_FILE: &str = ".diff-tree.toml";

/// Application configuration loaded from .diff-tree.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the source-control host
    #[serde(default = "default_host")]
    pub host: String,

    /// Environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Syntax highlighting theme (syntect theme name)
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Tree or flat list view
    #[serde(default)]
    pub view_mode: ViewMode,

    /// Keep fetched diffs and file contents in the on-disk cache
    #[serde(default = "default_cache")]
    pub cache: bool,
}

fn default_host() -> String {
    "https://gitlab.com".to_string()
}

fn default_token_env() -> String {
    "GITLAB_TOKEN".to_string()
}

fn default_theme() -> String {
    diff_tree::highlight::DEFAULT_THEME.to_string()
}

fn default_cache() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            token_env: default_token_env(),
            theme: default_theme(),
            view_mode: ViewMode::default(),
            cache: default_cache(),
        }
    }
}

impl AppConfig {
    /// Load the first config file found, or use defaults
    pub fn load() -> Self {
        Self::load_first(&Self::candidate_paths())
    }

    /// Config file locations in lookup order
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(home) = std::env::var_os("HOME") {
            paths.push(PathBuf::from(home).join(LOCAL_CONFIG_FILE));
        }
        match crate::paths::config_file_path() {
            Ok(path) => paths.push(path),
            Err(e) => log::debug!("No config directory: {}", e),
        }
        paths
    }

    /// Parse the first readable file of `paths`; a broken file falls back to defaults
    pub fn load_first(paths: &[PathBuf]) -> Self {
        let Some((path, content)) = paths
            .iter()
            .find_map(|path| std::fs::read_to_string(path).ok().map(|c| (path, c)))
        else {
            log::debug!("Using default app config");
            return Self::default();
        };

        match Self::parse(&content) {
            Ok(config) => {
                log::info!("Loaded app config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Failed to parse {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse config file content.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Read the API token from the configured environment variable.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}
