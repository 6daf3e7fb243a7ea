use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors produced while synchronizing albums and photos with the backend.
#[derive(Error, Debug)]
pub enum SyncError {
    /// No authenticated user; subscriptions and mutations cannot be scoped.
    #[error("not authenticated: {0}")]
    Auth(String),

    /// A query, mutation or transfer failed on the wire. Not retried.
    #[error("network error: {0}")]
    Network(String),

    /// One file's upload failed; the rest of the batch is unaffected.
    #[error("upload of '{key}' failed: {reason}")]
    Upload { key: String, reason: String },

    /// Image labeling failed. Best effort, callers proceed without labels.
    #[error("labeling failed: {0}")]
    Labeling(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Wrap any transport-level failure.
    pub fn network(err: impl std::fmt::Display) -> Self {
        SyncError::Network(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Network(err.to_string())
    }
}
