//! Optional external directory authenticator.

use async_trait::async_trait;

use crate::error::Result;

/// Verifies credentials against an external directory server.
///
/// When configured, the login path delegates credential verification here
/// instead of checking the local password hash; the wire protocol behind
/// it (LDAP or otherwise) is out of scope. Absence of an implementation
/// simply means local-credential verification only.
#[async_trait]
pub trait ExternalAuthenticator: Send + Sync {
    /// Verify a username/password pair. `Ok(true)` accepts, `Ok(false)`
    /// rejects; `Err` means the directory could not be consulted.
    async fn verify(&self, username: &str, password: &str) -> Result<bool>;
}
