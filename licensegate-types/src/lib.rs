//! Core type definitions for Licensegate.
//!
//! This crate defines the small set of types shared by every other crate:
//! - Client identifiers (operator-assigned, opaque strings)
//! - Millisecond epoch timestamps used for token expiry

mod ids;
mod timestamp;

pub use ids::ClientId;
pub use timestamp::{EpochMillis, now_millis};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("client id must not be blank")]
    BlankClientId,
}
