//! Collaborator interfaces for the Shelfmark web tier.
//!
//! Persistent bookmark/account storage, the archive store, and the
//! optional external directory authenticator are external services as far
//! as the cache subsystem is concerned; this crate defines the traits the
//! server consumes, plus an in-memory implementation (tests, seeding) and
//! a filesystem-backed archive store.

mod archive;
mod error;
mod external;
mod storage;

pub use archive::{ArchiveStore, AssetPayload, AssetRead, FsArchiveStore, MemoryArchiveStore};
pub use error::{Result, StoreError};
pub use external::ExternalAuthenticator;
pub use storage::{MemoryStorage, Storage};
