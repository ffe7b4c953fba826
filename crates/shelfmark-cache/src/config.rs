//! Configuration for the expiring cache.

use std::time::Duration;

/// Default time-to-live for cached entries (1 hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Default interval between physical sweeps (10 minutes).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// Configuration for an [`ExpiringCache`](crate::ExpiringCache).
///
/// Each cache instance carries its own config: eviction cadence differs
/// by access pattern, so caches are distinct objects, never a shared pool.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Time-to-live applied to every entry at insertion. Fixed, not
    /// sliding: reads do not extend an entry's life.
    pub ttl: Duration,

    /// Interval between sweeps of physically expired entries. Should not
    /// exceed `ttl`, or dead entries linger a full extra interval.
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl CacheConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}
