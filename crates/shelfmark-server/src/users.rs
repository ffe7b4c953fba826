//! Account cache.
//!
//! Read-through copy of account records, keyed by username, so every
//! authenticated request does not cost a storage lookup. Entries expire
//! on a fixed TTL regardless of read traffic: account records churn
//! slowly and a bounded staleness window is fine.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

use shelfmark_cache::{CacheConfig, ExpiringCache};
use shelfmark_types::Account;

/// Cache of authenticated user accounts, keyed by username.
#[derive(Clone)]
pub struct UserCache {
    inner: ExpiringCache<String, Account>,
}

impl UserCache {
    /// Create a user cache with the given TTL and sweep interval.
    pub fn new(ttl: Duration, sweep_interval: Duration) -> Self {
        let config = CacheConfig::new()
            .with_ttl(ttl)
            .with_sweep_interval(sweep_interval);
        Self {
            inner: ExpiringCache::new(config),
        }
    }

    /// Look up a cached account. A miss means the caller must fall back
    /// to persistent storage and [`store`](UserCache::store) the result.
    pub async fn lookup(&self, username: &str) -> Option<Account> {
        let account = self.inner.get(&username.to_string()).await;
        trace!(username = %username, hit = account.is_some(), "user cache lookup");
        account
    }

    /// Cache an account after a successful storage lookup or login.
    pub async fn store(&self, account: Account) {
        self.inner.insert(account.username.clone(), account).await;
    }

    /// Drop a cached account after the underlying record changes.
    pub async fn invalidate(&self, username: &str) {
        self.inner.remove(&username.to_string()).await;
    }

    /// Spawn the background sweep task for this cache.
    pub fn start_sweeper(&self) -> JoinHandle<()> {
        self.inner.start_sweeper()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn store_then_lookup() {
        let users = UserCache::new(Duration::from_secs(3600), Duration::from_secs(600));
        users.store(Account::new("alice", "hash")).await;

        assert!(users.lookup("alice").await.is_some());
        assert!(users.lookup("bob").await.is_none());
    }

    #[tokio::test]
    async fn invalidate_drops_the_entry() {
        let users = UserCache::new(Duration::from_secs(3600), Duration::from_secs(600));
        users.store(Account::new("alice", "hash")).await;

        users.invalidate("alice").await;
        assert!(users.lookup("alice").await.is_none());
    }

    #[tokio::test]
    async fn entries_expire_on_fixed_ttl() {
        let users = UserCache::new(Duration::from_millis(20), Duration::from_secs(600));
        users.store(Account::new("alice", "hash")).await;

        sleep(Duration::from_millis(50)).await;
        assert!(users.lookup("alice").await.is_none());
    }
}
