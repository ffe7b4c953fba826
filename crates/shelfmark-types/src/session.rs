//! Login session types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated login session.
///
/// The token is the cache key and the credential handed back to the
/// client; it is independent of the username. Expiry is fixed from
/// creation; reads do not extend it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unguessable session token.
    pub token: String,

    /// Account this session belongs to.
    pub username: String,

    /// When the session was created.
    pub created_at: DateTime<Utc>,

    /// When the session stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a session valid for `ttl_secs` seconds from now.
    pub fn new(token: impl Into<String>, username: impl Into<String>, ttl_secs: u64) -> Self {
        let created_at = Utc::now();
        Self {
            token: token.into(),
            username: username.into(),
            created_at,
            expires_at: created_at + Duration::seconds(ttl_secs as i64),
        }
    }

    /// Whether the session has passed its expiry instant.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}
