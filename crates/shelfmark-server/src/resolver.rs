//! Archive content cache and resolver.
//!
//! Materialized archive assets (page content, thumbnails, packaged
//! archives) are cached per `(bookmark, kind)` with a short TTL and
//! repopulated lazily from the archive store on miss. Population is
//! single-flight per key: concurrent requests for the same asset share
//! one archive-store read instead of duplicating it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use shelfmark_cache::{CacheConfig, ExpiringCache};
use shelfmark_store::{ArchiveStore, AssetPayload, AssetRead};
use shelfmark_types::{AssetKey, AssetKind, BookmarkId};

/// Cache of materialized archive assets.
pub type ArchiveContentCache = ExpiringCache<AssetKey, AssetPayload>;

/// Outcome of resolving an asset request.
///
/// Pending and unavailable are recoverable, user-visible states, not
/// errors; only collaborator failures surface as `Err`.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// The asset is materialized; serve these bytes.
    Ready(AssetPayload),

    /// The bookmark has not been archived yet; render a pending state.
    Pending,

    /// Archiving ran but this asset does not exist for the bookmark.
    Unavailable,
}

/// Resolves `(bookmark, kind)` requests against the content cache,
/// populating from the archive store on miss.
#[derive(Clone)]
pub struct ContentResolver {
    cache: ArchiveContentCache,
    archive: Arc<dyn ArchiveStore>,

    /// Per-key population locks. The outer mutex guards only the table
    /// (short critical sections); the inner async mutex is what a
    /// population holds across the archive-store call, so unrelated keys
    /// are never serialized behind a slow fetch.
    populating: Arc<Mutex<HashMap<AssetKey, Arc<tokio::sync::Mutex<()>>>>>,
}

impl ContentResolver {
    /// Create a resolver with its own content cache.
    pub fn new(ttl: Duration, sweep_interval: Duration, archive: Arc<dyn ArchiveStore>) -> Self {
        let config = CacheConfig::new()
            .with_ttl(ttl)
            .with_sweep_interval(sweep_interval);
        Self {
            cache: ExpiringCache::new(config),
            archive,
            populating: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Resolve one asset request: serve from cache, or populate from the
    /// archive store.
    ///
    /// A population either inserts the full payload or leaves the key
    /// absent; partial entries are never visible. Losers of the per-key
    /// race wait for the winner and then hit the cache.
    pub async fn resolve(
        &self,
        bookmark_id: BookmarkId,
        kind: AssetKind,
    ) -> shelfmark_store::Result<Resolution> {
        let key = AssetKey::new(bookmark_id, kind);

        if let Some(payload) = self.cache.get(&key).await {
            return Ok(Resolution::Ready(payload));
        }

        let lock = self.population_lock(key);
        let guard = lock.lock().await;

        // The winner may have populated while we waited for the lock.
        if let Some(payload) = self.cache.get(&key).await {
            drop(guard);
            self.release_population_lock(key, &lock);
            return Ok(Resolution::Ready(payload));
        }

        // The fetch-and-insert runs on its own task: populations are not
        // tied to the originating request, so an aborted request's work
        // still lands in the cache for whoever asks next.
        debug!(key = %key, "archive cache miss, populating");
        let archive = Arc::clone(&self.archive);
        let cache = self.cache.clone();
        let population = tokio::spawn(async move {
            let outcome = archive.read_asset(key.bookmark_id, key.kind).await;
            if let Ok(AssetRead::Ready(payload)) = &outcome {
                cache.insert(key, payload.clone()).await;
            }
            outcome
        });

        let resolution = match population.await {
            Ok(Ok(AssetRead::Ready(payload))) => Ok(Resolution::Ready(payload)),
            Ok(Ok(AssetRead::NotArchived)) => Ok(Resolution::Pending),
            Ok(Ok(AssetRead::Unavailable)) => Ok(Resolution::Unavailable),
            Ok(Err(e)) => Err(e),
            Err(e) => Err(shelfmark_store::StoreError::Backend(format!(
                "population task failed: {e}"
            ))),
        };

        drop(guard);
        self.release_population_lock(key, &lock);
        resolution
    }

    /// Drop every cached asset for a bookmark. Called when a bookmark is
    /// re-archived or deleted; staleness here is a correctness matter,
    /// never left to the TTL.
    pub async fn invalidate(&self, bookmark_id: BookmarkId) {
        for kind in AssetKind::ALL {
            self.cache.remove(&AssetKey::new(bookmark_id, kind)).await;
        }
        debug!(bookmark_id = %bookmark_id, "archive cache invalidated");
    }

    /// Direct access to the underlying cache.
    pub fn cache(&self) -> &ArchiveContentCache {
        &self.cache
    }

    /// Spawn the background sweep task for the content cache.
    pub fn start_sweeper(&self) -> JoinHandle<()> {
        self.cache.start_sweeper()
    }

    fn population_lock(&self, key: AssetKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut table = self.populating.lock();
        table
            .entry(key)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Remove the lock table entry once no other resolver holds it.
    /// Two strong counts mean the table's reference plus ours; any more
    /// and a waiter is still queued on the same lock.
    fn release_population_lock(&self, key: AssetKey, lock: &Arc<tokio::sync::Mutex<()>>) {
        let mut table = self.populating.lock();
        if Arc::strong_count(lock) == 2 {
            table.remove(&key);
        }
    }
}
