//! Error types for the authorization service.

use licensegate_store::StoreError;
use licensegate_token::TokenError;
use thiserror::Error;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by [`crate::AuthorizationService`].
///
/// "The store said no" is never an error; it is a normal answer. A
/// [`ServiceError::Store`] means the answer is unknown.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required client id was missing or blank.
    #[error("missing client")]
    MissingClient,

    /// The entitlement backend failed.
    #[error("entitlement store error: {0}")]
    Store(#[from] StoreError),

    /// A token could not be issued.
    #[error("token error: {0}")]
    Token(#[from] TokenError),
}

impl From<licensegate_types::Error> for ServiceError {
    fn from(err: licensegate_types::Error) -> Self {
        match err {
            licensegate_types::Error::BlankClientId => Self::MissingClient,
        }
    }
}
