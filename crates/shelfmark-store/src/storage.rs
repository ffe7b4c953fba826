//! Persistent storage interface.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use shelfmark_types::{Account, Bookmark, BookmarkId};

use crate::error::Result;

/// Persistent bookmark/account storage.
///
/// The cache subsystem only reads through this interface, except for
/// `create_account`, which exists so a first successful external-directory
/// login can provision a matching local record.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Look up an account by username.
    async fn account_by_name(&self, username: &str) -> Result<Option<Account>>;

    /// Create a local account record.
    async fn create_account(&self, account: Account) -> Result<()>;

    /// Look up a bookmark by id.
    async fn bookmark(&self, id: BookmarkId) -> Result<Option<Bookmark>>;

    /// List all bookmarks, newest first.
    async fn list_bookmarks(&self) -> Result<Vec<Bookmark>>;
}

/// In-memory storage used by tests and for seeding demo data.
#[derive(Default)]
pub struct MemoryStorage {
    accounts: RwLock<HashMap<String, Account>>,
    bookmarks: RwLock<BTreeMap<BookmarkId, Bookmark>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account.
    pub async fn insert_account(&self, account: Account) {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.username.clone(), account);
    }

    /// Seed a bookmark.
    pub async fn insert_bookmark(&self, bookmark: Bookmark) {
        let mut bookmarks = self.bookmarks.write().await;
        bookmarks.insert(bookmark.id, bookmark);
    }

    /// Wrap in an `Arc<dyn Storage>` for handing to the server.
    pub fn into_shared(self) -> Arc<dyn Storage> {
        Arc::new(self)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn account_by_name(&self, username: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(username).cloned())
    }

    async fn create_account(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.username.clone(), account);
        Ok(())
    }

    async fn bookmark(&self, id: BookmarkId) -> Result<Option<Bookmark>> {
        let bookmarks = self.bookmarks.read().await;
        Ok(bookmarks.get(&id).cloned())
    }

    async fn list_bookmarks(&self) -> Result<Vec<Bookmark>> {
        let bookmarks = self.bookmarks.read().await;
        let mut all: Vec<Bookmark> = bookmarks.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}
