//! Logging setup
//!
//! Logs go to stderr through `env_logger` unless `--log-file` is given, in
//! which case a simplelog `WriteLogger` appends to the cache directory
//! (`~/.cache/difftree/difftree.log` on Linux) and stderr stays clean.

use anyhow::Context;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::OpenOptions;
use std::path::PathBuf;

fn level_from_env() -> LevelFilter {
    std::env::var("RUST_LOG")
        .map(|v| match v.to_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Info,
        })
        .unwrap_or(LevelFilter::Info)
}

/// Initialize logging; returns the log file path when logging to a file
pub fn init(to_file: bool) -> anyhow::Result<Option<PathBuf>> {
    if !to_file {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp(None)
            .init();
        return Ok(None);
    }

    let log_file = diff_tree_config::paths::log_file_path()?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|c| c)
        .build();

    WriteLogger::init(level_from_env(), config, file).context("Failed to initialize logger")?;

    Ok(Some(log_file))
}
