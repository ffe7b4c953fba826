//! Error types for collaborator calls.

/// Error from a storage or archive-store collaborator.
///
/// Collaborators are possibly slower, possibly fallible external
/// services; their failures are transient from the caller's point of view
/// and safe to retry.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O failure talking to the backing store.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type for collaborator calls.
pub type Result<T> = std::result::Result<T, StoreError>;
