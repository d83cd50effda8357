//! Shared-secret authentication for admin endpoints.

use axum::http::HeaderMap;
use std::fmt;
use subtle::ConstantTimeEq;

/// Header carrying the admin secret.
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// The operator's shared secret.
#[derive(Clone)]
pub struct AdminSecret(String);

impl AdminSecret {
    /// Wraps the configured secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Compares `candidate` with the secret in constant time.
    ///
    /// An empty candidate never matches, even against an empty secret.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        if candidate.is_empty() {
            return false;
        }
        self.0.as_bytes().ct_eq(candidate.as_bytes()).into()
    }
}

impl fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminSecret(<redacted>)")
    }
}

/// Picks the presented secret: header first, then query, then body.
/// Empty values are skipped.
pub fn presented_secret<'a>(
    headers: &'a HeaderMap,
    query: Option<&'a str>,
    body: Option<&'a str>,
) -> &'a str {
    let header = headers
        .get(ADMIN_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());
    [header, query, body]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}
