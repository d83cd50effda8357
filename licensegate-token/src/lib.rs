//! Signed access tokens for Licensegate.
//!
//! An access token proves that a licensing check succeeded for a client at
//! issuance time. Tokens are never stored: they are verified statelessly from
//! their own bytes and a process-wide secret.
//!
//! # Token Format
//!
//! Tokens are formatted as: `base64url(payload).base64url(mac)`
//!
//! - The payload is JSON `{"clientId": "...", "exp": <epoch millis>}`
//! - The MAC is HMAC-SHA256 over the base64url-encoded payload string
//!
//! Possessing a token never grants anything on its own. Callers must re-check
//! the entitlement set for the decoded client on every validation.

mod codec;
mod error;

pub use codec::{AccessToken, TOKEN_TTL_MS, TokenClaims, TokenCodec};
pub use error::{TokenError, TokenResult};
