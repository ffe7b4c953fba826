//! Login session cache.
//!
//! The sole source of truth for "is this request logged in". Tokens are
//! 256-bit random values; expiry is fixed from creation and validation
//! never extends it.

use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use tokio::task::JoinHandle;
use tracing::debug;

use shelfmark_cache::{CacheConfig, ExpiringCache};
use shelfmark_types::Session;

/// Generate an unguessable token: 32 random bytes, base64url encoded.
pub(crate) fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Cache of active login sessions, keyed by token.
#[derive(Clone)]
pub struct SessionCache {
    inner: ExpiringCache<String, Session>,
    ttl: Duration,
}

impl SessionCache {
    /// Create a session cache with the given TTL and sweep interval.
    pub fn new(ttl: Duration, sweep_interval: Duration) -> Self {
        let config = CacheConfig::new()
            .with_ttl(ttl)
            .with_sweep_interval(sweep_interval);
        Self {
            inner: ExpiringCache::new(config),
            ttl,
        }
    }

    /// Create a session for a user, returning it with its fresh token.
    pub async fn create(&self, username: &str) -> Session {
        let session = Session::new(generate_token(), username, self.ttl.as_secs());
        self.inner
            .insert(session.token.clone(), session.clone())
            .await;
        debug!(username = %username, "session created");
        session
    }

    /// Validate a token, returning the username it belongs to.
    ///
    /// Returns `None` for missing and expired tokens alike: callers treat
    /// both as "not logged in", and the client can never tell whether a
    /// token once existed.
    pub async fn validate(&self, token: &str) -> Option<String> {
        let session = self.inner.get(&token.to_string()).await?;
        if session.is_expired() {
            return None;
        }
        Some(session.username)
    }

    /// Revoke a session immediately (logout). Removal does not wait for
    /// the sweep.
    pub async fn revoke(&self, token: &str) -> bool {
        let revoked = self.inner.remove(&token.to_string()).await.is_some();
        if revoked {
            debug!("session revoked");
        }
        revoked
    }

    /// Number of physically present sessions.
    pub async fn len(&self) -> usize {
        self.inner.len().await
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

    fn short_cache(ttl_ms: u64) -> SessionCache {
        SessionCache::new(Duration::from_millis(ttl_ms), Duration::from_secs(600))
    }

    #[test]
    fn tokens_are_unique_and_url_safe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43); // 32 bytes, base64url, no padding
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[tokio::test]
    async fn create_then_validate() {
        let sessions = SessionCache::new(Duration::from_secs(3600), Duration::from_secs(600));
        let session = sessions.create("alice").await;

        assert_eq!(
            sessions.validate(&session.token).await,
            Some("alice".to_string())
        );
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let sessions = short_cache(60_000);
        assert_eq!(sessions.validate("no-such-token").await, None);
    }

    #[tokio::test]
    async fn revoke_invalidates_before_any_sweep() {
        let sessions = short_cache(60_000);
        let session = sessions.create("alice").await;

        assert!(sessions.revoke(&session.token).await);
        assert_eq!(sessions.validate(&session.token).await, None);
        // Revoking again is a no-op.
        assert!(!sessions.revoke(&session.token).await);
    }

    #[tokio::test]
    async fn expired_token_is_invalid_without_a_sweep() {
        let sessions = short_cache(20);
        let session = sessions.create("alice").await;

        sleep(Duration::from_millis(50)).await;

        assert_eq!(sessions.validate(&session.token).await, None);
        // Still physically present; the sweeper owns removal.
        assert_eq!(sessions.len().await, 1);
    }

    #[tokio::test]
    async fn expiry_is_fixed_not_sliding() {
        let sessions = short_cache(80);
        let session = sessions.create("alice").await;

        // Repeated validation must not extend the session's life.
        for _ in 0..3 {
            sleep(Duration::from_millis(30)).await;
            let _ = sessions.validate(&session.token).await;
        }

        assert_eq!(sessions.validate(&session.token).await, None);
    }
}
