//! Error types for the token codec.

use thiserror::Error;

/// Token-specific errors.
///
/// These stay inside the crate boundary for callers that want the reason;
/// [`crate::TokenCodec::verify`] collapses all of them into `None`.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The signing secret cannot be used.
    #[error("invalid signing secret: {0}")]
    InvalidSecret(String),

    /// The token is not two non-empty dot-separated parts.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The MAC does not match the payload.
    #[error("token signature invalid")]
    InvalidSignature,

    /// The payload is not base64url JSON of the expected shape.
    #[error("invalid token payload: {0}")]
    InvalidPayload(String),

    /// The token expired at the given epoch millisecond.
    #[error("token expired at {0}")]
    Expired(i64),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;
