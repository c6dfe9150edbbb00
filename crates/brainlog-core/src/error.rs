//! Error types for brainlog-core

use thiserror::Error;

/// Result type alias using brainlog-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in brainlog-core operations.
///
/// Remote and auth failures are reported through outcome values by the sync
/// engine; only local persistence problems surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Local blob store error
    #[error("Local storage error: {0}")]
    Storage(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
