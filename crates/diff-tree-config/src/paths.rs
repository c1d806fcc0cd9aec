//! Configuration and data directory paths
//!
//! Uses XDG directories via `dirs` crate.
//!
//! Platform-specific locations:
//! - Linux: `~/.config/difftree/`, `~/.cache/difftree/`
//! - macOS: `~/Library/Application Support/difftree/`, `~/Library/Caches/difftree/`
//! - Windows: `%APPDATA%\difftree\`, `%LOCALAPPDATA%\difftree\`

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "difftree";

/// Get the application config directory, creating it if needed
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir)
}

/// Get the application cache directory, creating it if needed
pub fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine cache directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir)
}

/// Get path to the log file used when logging to a file is requested
pub fn log_file_path() -> Result<PathBuf> {
    Ok(cache_dir()?.join("difftree.log"))
}

/// Get path to the persisted API response cache
pub fn api_cache_path() -> Result<PathBuf> {
    Ok(cache_dir()?.join("api-cache.json"))
}

/// Get path to the config file kept in the config directory
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}
