//! Archived asset kinds and cache keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bookmark::BookmarkId;

/// The kind of derived asset stored for an archived bookmark.
///
/// Content and thumbnail are independent cache keys even though they come
/// from the same capture: their payload sizes and staleness tolerance differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Readable page content extracted from the capture.
    Content,
    /// Thumbnail image extracted from the capture.
    Thumbnail,
    /// The packaged offline archive itself.
    Archive,
}

impl AssetKind {
    /// All asset kinds a bookmark can have. Invalidation walks this list.
    pub const ALL: [AssetKind; 3] = [AssetKind::Content, AssetKind::Thumbnail, AssetKind::Archive];

    /// Stable name used in paths and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Content => "content",
            AssetKind::Thumbnail => "thumbnail",
            AssetKind::Archive => "archive",
        }
    }

    /// Content type served when the archive store does not record one.
    pub fn default_content_type(&self) -> &'static str {
        match self {
            AssetKind::Content => "text/html; charset=utf-8",
            AssetKind::Thumbnail => "image/jpeg",
            AssetKind::Archive => "application/zip",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an asset kind name is not recognized.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown asset kind: {0}")]
pub struct ParseAssetKindError(pub String);

impl FromStr for AssetKind {
    type Err = ParseAssetKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content" => Ok(AssetKind::Content),
            "thumbnail" => Ok(AssetKind::Thumbnail),
            "archive" => Ok(AssetKind::Archive),
            other => Err(ParseAssetKindError(other.to_string())),
        }
    }
}

/// Unique key for a materialized archive asset: one bookmark, one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetKey {
    pub bookmark_id: BookmarkId,
    pub kind: AssetKind,
}

impl AssetKey {
    pub fn new(bookmark_id: BookmarkId, kind: AssetKind) -> Self {
        Self { bookmark_id, kind }
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bookmark_id, self.kind)
    }
}
