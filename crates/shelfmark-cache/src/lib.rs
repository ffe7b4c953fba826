//! Expiring key/value cache with periodic sweep.
//!
//! This crate provides the generic cache every Shelfmark cache is built
//! on: fixed per-entry time-to-live, logical expiry on read, and physical
//! eviction by a background sweep task rather than by readers.
//!
//! # Example
//!
//! ```rust,ignore
//! use shelfmark_cache::{CacheConfig, ExpiringCache};
//!
//! let config = CacheConfig::new()
//!     .with_ttl(Duration::from_secs(3600))
//!     .with_sweep_interval(Duration::from_secs(600));
//!
//! let cache: ExpiringCache<String, String> = ExpiringCache::new(config);
//! let _sweeper = cache.start_sweeper();
//! ```

mod cache;
mod config;

pub use cache::{CacheEntry, CacheStats, ExpiringCache};
pub use config::CacheConfig;
