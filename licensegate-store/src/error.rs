//! Error types for the entitlement store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in entitlement store operations.
///
/// A store error means the membership answer is unknown. It must never be
/// treated as "not entitled".
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network error talking to the remote backend.
    #[error("network error: {0}")]
    Network(String),

    /// The remote backend did not answer within the configured timeout.
    #[error("operation timed out")]
    Timeout,

    /// The remote backend answered with an error.
    #[error("backend error: {0}")]
    Backend(String),

    /// The remote backend answered with something we did not expect.
    #[error("unexpected backend reply: {0}")]
    UnexpectedReply(String),

    /// The local snapshot could not be written.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
