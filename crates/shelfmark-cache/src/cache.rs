//! The expiring cache itself.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::config::CacheConfig;

/// Entry stored in the cache.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Cached value.
    pub value: V,

    /// Deadline computed at insertion (`now + ttl`). The entry is
    /// logically dead past this instant even before the sweep removes it.
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, expires_at: Instant) -> Self {
        Self { value, expires_at }
    }

    /// Whether this entry has passed its deadline.
    pub fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Thread-safe key/value cache with fixed per-entry TTL.
///
/// Reads take only the read lock and treat expired-but-unswept entries as
/// absent; they never remove anything, so read latency never pays
/// eviction cost and readers never block other readers. Physical removal
/// happens in [`sweep`](ExpiringCache::sweep), driven by the background
/// task from [`start_sweeper`](ExpiringCache::start_sweeper), never
/// inline with `get`/`insert`.
///
/// The handle is cheap to clone; clones share the same underlying map.
pub struct ExpiringCache<K, V> {
    inner: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    config: CacheConfig,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a new cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Store a value with a fresh deadline of now + ttl.
    ///
    /// Overwrites any prior entry for the key, expired or not, resetting
    /// its deadline.
    pub async fn insert(&self, key: K, value: V) {
        let entry = CacheEntry::new(value, Instant::now() + self.config.ttl);
        let mut inner = self.inner.write().await;
        inner.insert(key, entry);
        trace!(cache_size = inner.len(), "cache insert");
    }

    /// Get a value if present and not logically expired.
    ///
    /// An expired entry still awaiting the sweep is reported as absent;
    /// its removal is left to the sweeper.
    pub async fn get(&self, key: &K) -> Option<V> {
        let inner = self.inner.read().await;
        inner
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    /// Whether a live entry exists for the key.
    pub async fn contains(&self, key: &K) -> bool {
        let inner = self.inner.read().await;
        inner.get(key).is_some_and(|entry| !entry.is_expired())
    }

    /// Explicitly invalidate an entry, returning its value if it was live.
    ///
    /// Used when the underlying data changes; correctness of invalidation
    /// never relies on the TTL.
    pub async fn remove(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.write().await;
        inner
            .remove(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value)
    }

    /// Number of physically present entries, including expired ones the
    /// sweep has not reached yet.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether the cache holds no entries at all.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Remove all physically expired entries, returning how many went.
    ///
    /// Expired keys are collected under the read lock first, then removed
    /// under the write lock with a per-key re-check (an overwrite may have
    /// given the key a fresh deadline in between), so the write lock is
    /// held only for the removals themselves.
    pub async fn sweep(&self) -> usize {
        let expired: Vec<K> = {
            let inner = self.inner.read().await;
            inner
                .iter()
                .filter(|(_, entry)| entry.is_expired())
                .map(|(key, _)| key.clone())
                .collect()
        };

        if expired.is_empty() {
            return 0;
        }

        let mut removed = 0;
        let mut inner = self.inner.write().await;
        for key in expired {
            if inner.get(&key).is_some_and(|entry| entry.is_expired()) {
                inner.remove(&key);
                removed += 1;
            }
        }
        drop(inner);

        if removed > 0 {
            debug!(removed, "swept expired cache entries");
        }
        removed
    }

    /// Spawn the background sweep task.
    ///
    /// Runs [`sweep`](ExpiringCache::sweep) every `sweep_interval` on an
    /// independent timer. The returned handle can be aborted at shutdown;
    /// dropping it leaves the task running for the process lifetime.
    pub fn start_sweeper(&self) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(cache.config.sweep_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                cache.sweep().await;
            }
        })
    }

    /// Get cache statistics.
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            len: self.inner.read().await.len(),
            ttl: self.config.ttl,
        }
    }
}

impl<K, V> Clone for ExpiringCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            config: self.config.clone(),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Physically present entries.
    pub len: usize,

    /// Configured time-to-live.
    pub ttl: std::time::Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    fn cache_with_ttl(ttl: Duration) -> ExpiringCache<String, String> {
        ExpiringCache::new(
            CacheConfig::new()
                .with_ttl(ttl)
                .with_sweep_interval(Duration::from_secs(600)),
        )
    }

    #[tokio::test]
    async fn insert_and_get_within_ttl() {
        let cache = cache_with_ttl(Duration::from_secs(60));
        cache.insert("k".to_string(), "v".to_string()).await;
        assert_eq!(cache.get(&"k".to_string()).await, Some("v".to_string()));
    }

    #[tokio::test]
    async fn get_missing_key() {
        let cache = cache_with_ttl(Duration::from_secs(60));
        assert_eq!(cache.get(&"missing".to_string()).await, None);
    }

    #[tokio::test]
    async fn expired_entry_is_absent_without_a_sweep() {
        let cache = cache_with_ttl(Duration::from_millis(20));
        cache.insert("k".to_string(), "v".to_string()).await;

        sleep(Duration::from_millis(50)).await;

        // Logically expired: get reports absence...
        assert_eq!(cache.get(&"k".to_string()).await, None);
        assert!(!cache.contains(&"k".to_string()).await);
        // ...but the entry is still physically present until the sweep.
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn overwrite_resets_deadline() {
        let cache = cache_with_ttl(Duration::from_millis(60));
        cache.insert("k".to_string(), "old".to_string()).await;

        sleep(Duration::from_millis(40)).await;
        cache.insert("k".to_string(), "new".to_string()).await;

        // Past the original deadline, within the refreshed one.
        sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get(&"k".to_string()).await, Some("new".to_string()));
    }

    #[tokio::test]
    async fn remove_invalidates_immediately() {
        let cache = cache_with_ttl(Duration::from_secs(60));
        cache.insert("k".to_string(), "v".to_string()).await;

        assert_eq!(cache.remove(&"k".to_string()).await, Some("v".to_string()));
        assert_eq!(cache.get(&"k".to_string()).await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn remove_expired_entry_returns_none() {
        let cache = cache_with_ttl(Duration::from_millis(10));
        cache.insert("k".to_string(), "v".to_string()).await;

        sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.remove(&"k".to_string()).await, None);
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_entries() {
        let cache = cache_with_ttl(Duration::from_millis(30));
        cache.insert("old".to_string(), "v".to_string()).await;

        sleep(Duration::from_millis(50)).await;
        cache.insert("fresh".to_string(), "v".to_string()).await;

        let removed = cache.sweep().await;
        assert_eq!(removed, 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.contains(&"fresh".to_string()).await);
    }

    #[tokio::test]
    async fn sweep_on_empty_cache_is_a_noop() {
        let cache = cache_with_ttl(Duration::from_millis(10));
        assert_eq!(cache.sweep().await, 0);
    }

    #[tokio::test]
    async fn background_sweeper_purges_physically() {
        let cache: ExpiringCache<String, String> = ExpiringCache::new(
            CacheConfig::new()
                .with_ttl(Duration::from_millis(10))
                .with_sweep_interval(Duration::from_millis(20)),
        );
        let sweeper = cache.start_sweeper();

        cache.insert("k".to_string(), "v".to_string()).await;
        sleep(Duration::from_millis(80)).await;

        assert_eq!(cache.len().await, 0);
        sweeper.abort();
    }

    #[tokio::test]
    async fn clones_share_the_same_map() {
        let cache = cache_with_ttl(Duration::from_secs(60));
        let clone = cache.clone();

        cache.insert("k".to_string(), "v".to_string()).await;
        assert_eq!(clone.get(&"k".to_string()).await, Some("v".to_string()));
    }

    #[tokio::test]
    async fn concurrent_writers_and_readers() {
        let cache = cache_with_ttl(Duration::from_secs(60));

        let mut handles = Vec::new();
        for i in 0..16 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let key = format!("key-{}", i);
                cache.insert(key.clone(), format!("value-{}", i)).await;
                cache.get(&key).await
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), Some(format!("value-{}", i)));
        }
        assert_eq!(cache.len().await, 16);
    }

    #[tokio::test]
    async fn stats_report_len_and_ttl() {
        let cache = cache_with_ttl(Duration::from_secs(60));
        cache.insert("k".to_string(), "v".to_string()).await;

        let stats = cache.stats().await;
        assert_eq!(stats.len, 1);
        assert_eq!(stats.ttl, Duration::from_secs(60));
    }
}
