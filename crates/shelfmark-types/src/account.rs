//! Account types.

use serde::{Deserialize, Serialize};

/// A local user account.
///
/// Owned by persistent storage; the server keeps a time-bounded
/// read-through copy in its account cache. The password hash is an
/// argon2 PHC string and is never serialized into API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique login name.
    pub username: String,

    /// Argon2 PHC-format credential hash.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Whether this account may manage other accounts.
    #[serde(default)]
    pub admin: bool,
}

impl Account {
    /// Create a new non-admin account.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            admin: false,
        }
    }

    /// Mark the account as an administrator.
    pub fn with_admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_not_serialized() {
        let account = Account::new("alice", "$argon2id$v=19$m=19456,t=2,p=1$abc$def");
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("alice"));
    }

    #[test]
    fn admin_defaults_to_false_on_deserialize() {
        let account: Account =
            serde_json::from_str(r#"{"username":"bob","password_hash":"x"}"#).unwrap();
        assert!(!account.admin);
    }
}
