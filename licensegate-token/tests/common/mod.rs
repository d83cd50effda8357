//! Shared test helpers for token tests.

#![allow(dead_code)]

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use licensegate_token::TokenCodec;
use licensegate_types::ClientId;
use sha2::Sha256;

pub const TEST_SECRET: &str = "test-signing-secret";

/// Returns a codec keyed with [`TEST_SECRET`].
pub fn test_codec() -> TokenCodec {
    TokenCodec::new(TEST_SECRET).unwrap()
}

pub fn client(id: &str) -> ClientId {
    ClientId::parse(id).unwrap()
}

/// Creates a token string `base64url(payload_json).base64url(mac)` signed
/// with `secret`, bypassing the codec.
pub fn sign_raw(secret: &str, payload_json: &str) -> String {
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload_json.as_bytes());
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(payload_b64.as_bytes());
    let sig_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    format!("{payload_b64}.{sig_b64}")
}

/// Flips one bit of the byte at `index` in the signature half.
pub fn flip_signature_byte(token: &str, index: usize) -> String {
    let (payload, sig) = token.split_once('.').unwrap();
    let mut raw = URL_SAFE_NO_PAD.decode(sig).unwrap();
    raw[index] ^= 0x01;
    format!("{payload}.{}", URL_SAFE_NO_PAD.encode(raw))
}
