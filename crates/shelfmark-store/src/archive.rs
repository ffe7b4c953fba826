//! Archive store interface.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::debug;

use shelfmark_types::{AssetKey, AssetKind, BookmarkId};

use crate::error::Result;

/// Materialized bytes for one archived asset.
///
/// The body is refcount-shared so cache hits hand out the payload without
/// copying potentially large captures.
#[derive(Debug, Clone)]
pub struct AssetPayload {
    /// Raw asset bytes.
    pub body: Bytes,

    /// Content type to serve the bytes with.
    pub content_type: String,
}

impl AssetPayload {
    pub fn new(body: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: content_type.into(),
        }
    }
}

/// Outcome of reading an asset from the archive store.
///
/// "Never archived" and "archived but this asset is missing" are distinct,
/// recoverable outcomes; neither is an error.
#[derive(Debug, Clone)]
pub enum AssetRead {
    /// The asset exists; here are its bytes.
    Ready(AssetPayload),

    /// The bookmark has never been archived. Callers render a pending
    /// state and may retry later.
    NotArchived,

    /// Archiving ran but this asset kind does not exist for the bookmark
    /// (e.g. no thumbnail could be extracted).
    Unavailable,
}

/// The offline archive store.
///
/// Produces captured snapshots of bookmarked pages; the capture pipeline
/// and the archive file format's internals live outside this subsystem.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Read the bytes of one asset kind for one bookmark.
    async fn read_asset(&self, id: BookmarkId, kind: AssetKind) -> Result<AssetRead>;
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory implementation
// ─────────────────────────────────────────────────────────────────────────────

enum StoredAsset {
    Ready(AssetPayload),
    Unavailable,
}

/// In-memory archive store for tests and demos.
///
/// Counts reads so tests can observe the single-flight guarantee, and can
/// delay reads to widen the race window concurrent resolvers contend in.
#[derive(Default)]
pub struct MemoryArchiveStore {
    assets: RwLock<HashMap<AssetKey, StoredAsset>>,
    reads: AtomicUsize,
    read_delay: Option<Duration>,
}

impl MemoryArchiveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every read by `delay`, simulating a slow collaborator.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    /// Store asset bytes for a bookmark.
    pub async fn put_asset(
        &self,
        id: BookmarkId,
        kind: AssetKind,
        body: Vec<u8>,
        content_type: impl Into<String>,
    ) {
        let mut assets = self.assets.write().await;
        assets.insert(
            AssetKey::new(id, kind),
            StoredAsset::Ready(AssetPayload::new(body, content_type)),
        );
    }

    /// Mark an asset kind as attempted-but-missing for a bookmark.
    pub async fn put_unavailable(&self, id: BookmarkId, kind: AssetKind) {
        let mut assets = self.assets.write().await;
        assets.insert(AssetKey::new(id, kind), StoredAsset::Unavailable);
    }

    /// How many `read_asset` calls have been made.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Wrap in an `Arc<dyn ArchiveStore>` for handing to the server.
    pub fn into_shared(self) -> Arc<dyn ArchiveStore> {
        Arc::new(self)
    }
}

#[async_trait]
impl ArchiveStore for MemoryArchiveStore {
    async fn read_asset(&self, id: BookmarkId, kind: AssetKind) -> Result<AssetRead> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }

        let assets = self.assets.read().await;
        Ok(match assets.get(&AssetKey::new(id, kind)) {
            Some(StoredAsset::Ready(payload)) => AssetRead::Ready(payload.clone()),
            Some(StoredAsset::Unavailable) => AssetRead::Unavailable,
            None => AssetRead::NotArchived,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Filesystem implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Archive store backed by a data directory.
///
/// Layout: `<data_dir>/archive/<bookmark id>/` holds one file per asset
/// kind (`content.html`, `thumbnail.jpg`, `archive.zip`). A missing
/// directory means the bookmark was never archived; a missing file inside
/// an existing directory means that asset kind is unavailable. The files'
/// internal encoding is the capture pipeline's business, not ours.
pub struct FsArchiveStore {
    data_dir: PathBuf,
}

impl FsArchiveStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn bookmark_dir(&self, id: BookmarkId) -> PathBuf {
        self.data_dir.join("archive").join(id.to_string())
    }

    fn asset_file(kind: AssetKind) -> &'static str {
        match kind {
            AssetKind::Content => "content.html",
            AssetKind::Thumbnail => "thumbnail.jpg",
            AssetKind::Archive => "archive.zip",
        }
    }
}

#[async_trait]
impl ArchiveStore for FsArchiveStore {
    async fn read_asset(&self, id: BookmarkId, kind: AssetKind) -> Result<AssetRead> {
        let dir = self.bookmark_dir(id);
        if !tokio::fs::try_exists(&dir).await? {
            return Ok(AssetRead::NotArchived);
        }

        let path = dir.join(Self::asset_file(kind));
        match tokio::fs::read(&path).await {
            Ok(body) => {
                debug!(bookmark_id = %id, kind = %kind, bytes = body.len(), "asset read from disk");
                Ok(AssetRead::Ready(AssetPayload::new(
                    body,
                    kind.default_content_type(),
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AssetRead::Unavailable),
            Err(e) => Err(e.into()),
        }
    }
}
