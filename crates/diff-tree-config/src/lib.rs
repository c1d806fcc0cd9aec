//! Configuration and directory paths for difftree
//!
//! This crate provides:
//! - Config/cache directory utilities
//! - Application configuration (AppConfig) loaded from TOML

pub mod app_config;
pub mod paths;

pub use app_config::AppConfig;
pub use paths::{api_cache_path, cache_dir, config_dir};
