//! Optional TOML config file for the serve command.
//!
//! CLI flags override config file values; the file covers what a
//! deployment would rather not repeat on every invocation.
//!
//! ```toml
//! [server]
//! port = 8080
//! address = "0.0.0.0"
//! webroot = "/bookmarks"
//!
//! [cache]
//! session_ttl_secs = 3600
//! archive_ttl_secs = 60
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level config file structure.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub cache: CacheSection,
}

/// `[server]` section.
#[derive(Debug, Default, Deserialize)]
pub struct ServerSection {
    pub port: Option<u16>,
    pub address: Option<String>,
    pub webroot: Option<String>,
    pub assets_dir: Option<PathBuf>,
}

/// `[cache]` section. All durations in seconds.
#[derive(Debug, Default, Deserialize)]
pub struct CacheSection {
    pub session_ttl_secs: Option<u64>,
    pub session_sweep_secs: Option<u64>,
    pub archive_ttl_secs: Option<u64>,
    pub archive_sweep_secs: Option<u64>,
    pub grant_ttl_secs: Option<u64>,
}

/// Load a config file.
pub fn load(path: &Path) -> Result<FileConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("cannot parse config file {}", path.display()))
}
