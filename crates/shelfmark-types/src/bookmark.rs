//! Bookmark types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Numeric bookmark identifier assigned by persistent storage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BookmarkId(pub i64);

impl fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for BookmarkId {
    fn from(id: i64) -> Self {
        BookmarkId(id)
    }
}

impl From<i32> for BookmarkId {
    fn from(id: i32) -> Self {
        BookmarkId(id as i64)
    }
}

/// Error returned when a bookmark ID cannot be parsed from a path segment.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid bookmark id: {0}")]
pub struct ParseBookmarkIdError(pub String);

impl FromStr for BookmarkId {
    type Err = ParseBookmarkIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(BookmarkId)
            .map_err(|_| ParseBookmarkIdError(s.to_string()))
    }
}

/// A stored bookmark, as returned by the storage collaborator.
///
/// Creation, editing, and search live outside this subsystem; this is the
/// read-through shape the web tier serves from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: BookmarkId,
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Bookmark {
    /// Create a bookmark with the given id, url, and title.
    pub fn new(id: impl Into<BookmarkId>, url: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            url: url.into(),
            title: title.into(),
            excerpt: None,
            created_at: now,
            modified_at: now,
        }
    }

    /// Attach an excerpt.
    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }
}
