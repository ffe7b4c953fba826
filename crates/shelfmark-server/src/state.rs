//! Application state shared across handlers.
//!
//! One server lifetime owns exactly one instance of each cache,
//! constructed here at startup and torn down at shutdown; no hidden
//! process-wide singletons.

use std::sync::Arc;

use tokio::task::JoinHandle;

use shelfmark_store::{ArchiveStore, ExternalAuthenticator, Storage};
use shelfmark_types::Account;

use crate::auth::AssetGrants;
use crate::config::ServerConfig;
use crate::error::Result;
use crate::resolver::ContentResolver;
use crate::sessions::SessionCache;
use crate::users::UserCache;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Persistent storage collaborator.
    pub storage: Arc<dyn Storage>,

    /// Optional external directory authenticator. Absent means
    /// local-credential verification only.
    pub external_auth: Option<Arc<dyn ExternalAuthenticator>>,

    /// Read-through account cache.
    pub users: UserCache,

    /// Active login sessions.
    pub sessions: SessionCache,

    /// Embedded-rendering capability grants.
    pub grants: AssetGrants,

    /// Archive content cache and population logic.
    pub resolver: ContentResolver,
}

impl AppState {
    /// Create application state with its three caches.
    pub fn new(
        config: ServerConfig,
        storage: Arc<dyn Storage>,
        archive: Arc<dyn ArchiveStore>,
    ) -> Self {
        let users = UserCache::new(config.session_ttl, config.session_sweep_interval);
        let sessions = SessionCache::new(config.session_ttl, config.session_sweep_interval);
        let grants = AssetGrants::new(config.grant_ttl, config.archive_sweep_interval);
        let resolver =
            ContentResolver::new(config.archive_ttl, config.archive_sweep_interval, archive);

        Self {
            config: Arc::new(config),
            storage,
            external_auth: None,
            users,
            sessions,
            grants,
            resolver,
        }
    }

    /// Plug in an external directory authenticator.
    pub fn with_external_authenticator(mut self, auth: Arc<dyn ExternalAuthenticator>) -> Self {
        self.external_auth = Some(auth);
        self
    }

    /// Start the background sweep task of every cache.
    ///
    /// The handles can be aborted at shutdown; dropping them leaves the
    /// sweepers running for the process lifetime.
    pub fn start_sweepers(&self) -> Vec<JoinHandle<()>> {
        vec![
            self.users.start_sweeper(),
            self.sessions.start_sweeper(),
            self.grants.start_sweeper(),
            self.resolver.start_sweeper(),
        ]
    }

    /// Resolve an account through the cache, falling back to storage and
    /// caching the result.
    pub async fn account(&self, username: &str) -> Result<Option<Account>> {
        if let Some(account) = self.users.lookup(username).await {
            return Ok(Some(account));
        }

        match self.storage.account_by_name(username).await? {
            Some(account) => {
                self.users.store(account.clone()).await;
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }
}
