//! Token issuance and HMAC-SHA256 verification.
//!
//! The MAC covers `payload_b64.as_bytes()` (the base64url-encoded payload
//! string, not the decoded JSON).

use crate::error::{TokenError, TokenResult};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use licensegate_types::{ClientId, EpochMillis, now_millis};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of an issued token (7 days, in milliseconds).
pub const TOKEN_TTL_MS: i64 = 7 * 24 * 60 * 60 * 1000;

const SEPARATOR: char = '.';

/// The decoded token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Client the token was issued to.
    #[serde(rename = "clientId")]
    pub client_id: ClientId,
    /// Expiry (milliseconds since epoch).
    pub exp: EpochMillis,
}

impl TokenClaims {
    /// Returns true if the claims are expired at `now`.
    ///
    /// A token expiring exactly at `now` is still valid.
    #[must_use]
    pub fn is_expired_at(&self, now: EpochMillis) -> bool {
        self.exp < now
    }
}

/// An encoded, signed access token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Returns the token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token, returning the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues and verifies access tokens with a single process-wide secret.
///
/// Rotating the secret invalidates every token issued before; there is no
/// key id in the token.
#[derive(Clone)]
pub struct TokenCodec {
    mac: HmacSha256,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl TokenCodec {
    /// Creates a codec keyed with `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidSecret`] if the secret is empty.
    pub fn new(secret: impl AsRef<[u8]>) -> TokenResult<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret(
                "secret must not be empty".to_string(),
            ));
        }
        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| TokenError::InvalidSecret(e.to_string()))?;
        Ok(Self { mac })
    }

    /// Issues a token for `client` expiring [`TOKEN_TTL_MS`] from now.
    pub fn issue(&self, client: &ClientId) -> TokenResult<AccessToken> {
        self.issue_at(client, now_millis())
    }

    /// Issues a token for `client` as if the current time were `now`.
    pub fn issue_at(&self, client: &ClientId, now: EpochMillis) -> TokenResult<AccessToken> {
        self.encode(&TokenClaims {
            client_id: client.clone(),
            exp: now.saturating_add(TOKEN_TTL_MS),
        })
    }

    /// Signs arbitrary claims.
    ///
    /// [`TokenCodec::issue`] is the normal entry point; this exists for
    /// tooling and for building tokens with a chosen expiry.
    pub fn encode(&self, claims: &TokenClaims) -> TokenResult<AccessToken> {
        let payload_json = serde_json::to_vec(claims)?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload_json);
        let sig_b64 = URL_SAFE_NO_PAD.encode(self.sign(payload_b64.as_bytes()));
        Ok(AccessToken(format!("{payload_b64}{SEPARATOR}{sig_b64}")))
    }

    /// Decodes and checks a token against the current time.
    pub fn decode(&self, token: &str) -> TokenResult<TokenClaims> {
        self.decode_at(token, now_millis())
    }

    /// Decodes and checks a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is malformed, its MAC does not match,
    /// its payload cannot be decoded, or it has expired.
    pub fn decode_at(&self, token: &str, now: EpochMillis) -> TokenResult<TokenClaims> {
        let token = token.trim();

        let (payload_b64, sig_b64) = token.split_once(SEPARATOR).ok_or_else(|| {
            TokenError::Malformed("token must have two parts separated by a dot".to_string())
        })?;
        if payload_b64.is_empty() || sig_b64.is_empty() || sig_b64.contains(SEPARATOR) {
            return Err(TokenError::Malformed(
                "token must have exactly two non-empty parts".to_string(),
            ));
        }

        let sig_bytes = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|_| TokenError::InvalidSignature)?;

        // Constant-time comparison.
        let mut mac = self.mac.clone();
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&sig_bytes)
            .map_err(|_| TokenError::InvalidSignature)?;

        let payload_json = URL_SAFE_NO_PAD.decode(payload_b64).map_err(|e| {
            TokenError::InvalidPayload(format!("invalid payload base64: {e}"))
        })?;
        let claims: TokenClaims = serde_json::from_slice(&payload_json).map_err(|e| {
            TokenError::InvalidPayload(format!("invalid payload JSON: {e}"))
        })?;
        if claims.client_id.is_blank() {
            return Err(TokenError::InvalidPayload("blank clientId".to_string()));
        }

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired(claims.exp));
        }

        Ok(claims)
    }

    /// Returns the client a token was issued to, or `None` for any token
    /// that is not currently valid.
    ///
    /// Never panics on malformed input.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<ClientId> {
        self.verify_at(token, now_millis())
    }

    /// [`TokenCodec::verify`] as if the current time were `now`.
    #[must_use]
    pub fn verify_at(&self, token: &str, now: EpochMillis) -> Option<ClientId> {
        self.decode_at(token, now).ok().map(|claims| claims.client_id)
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}
