//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default TTL for cached sessions and accounts (1 hour).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

/// Default sweep interval for the session and account caches (10 minutes).
pub const DEFAULT_SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// Default TTL for materialized archive content (1 minute). Archive
/// payloads are large and cheap to re-materialize, so they expire fast.
pub const DEFAULT_ARCHIVE_TTL: Duration = Duration::from_secs(60);

/// Default sweep interval for the archive content cache. Matches the TTL
/// so dead payloads never linger more than one extra window.
pub const DEFAULT_ARCHIVE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Default TTL for embedded-rendering asset grants (5 minutes): long
/// enough for a page full of `<img>` tags to finish loading.
pub const DEFAULT_GRANT_TTL: Duration = Duration::from_secs(300);

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Root path every route is mounted under, for deployments behind a
    /// reverse-proxy path prefix. Normalized: always starts with `/`,
    /// never ends with one; `/` alone means no prefix.
    pub root_path: String,

    /// Directory served at `{root}/assets` without authentication.
    /// `None` disables static file serving.
    pub assets_dir: Option<PathBuf>,

    /// Fixed TTL for login sessions and cached accounts.
    pub session_ttl: Duration,

    /// Sweep interval for the session and account caches.
    pub session_sweep_interval: Duration,

    /// Fixed TTL for materialized archive content.
    pub archive_ttl: Duration,

    /// Sweep interval for the archive content cache.
    pub archive_sweep_interval: Duration,

    /// Fixed TTL for embedded-rendering asset grants.
    pub grant_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".parse().unwrap(),
            root_path: "/".to_string(),
            assets_dir: None,
            session_ttl: DEFAULT_SESSION_TTL,
            session_sweep_interval: DEFAULT_SESSION_SWEEP_INTERVAL,
            archive_ttl: DEFAULT_ARCHIVE_TTL,
            archive_sweep_interval: DEFAULT_ARCHIVE_SWEEP_INTERVAL,
            grant_ttl: DEFAULT_GRANT_TTL,
        }
    }
}

impl ServerConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the root path prefix. The value is normalized; `""` and `"/"`
    /// both mean no prefix.
    pub fn with_root_path(mut self, root: impl AsRef<str>) -> Self {
        self.root_path = normalize_root_path(root.as_ref());
        self
    }

    /// Serve static files from this directory at `{root}/assets`.
    pub fn with_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = Some(dir.into());
        self
    }

    /// Set the session/account TTL.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Set the session/account cache sweep interval.
    pub fn with_session_sweep_interval(mut self, interval: Duration) -> Self {
        self.session_sweep_interval = interval;
        self
    }

    /// Set the archive content TTL.
    pub fn with_archive_ttl(mut self, ttl: Duration) -> Self {
        self.archive_ttl = ttl;
        self
    }

    /// Set the archive content cache sweep interval.
    pub fn with_archive_sweep_interval(mut self, interval: Duration) -> Self {
        self.archive_sweep_interval = interval;
        self
    }

    /// Set the asset grant TTL.
    pub fn with_grant_ttl(mut self, ttl: Duration) -> Self {
        self.grant_ttl = ttl;
        self
    }

    /// Whether a non-trivial root prefix is configured.
    pub fn has_root_prefix(&self) -> bool {
        self.root_path != "/"
    }
}

/// Normalize a root path prefix: ensure a leading slash, trim trailing
/// slashes, collapse empty input to `/`.
pub fn normalize_root_path(root: &str) -> String {
    let trimmed = root.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
