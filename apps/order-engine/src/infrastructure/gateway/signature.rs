//! Webhook signature verification.
//!
//! The gateway signs `{timestamp}.{raw_body}` with HMAC-SHA256 and sends
//! `t=<timestamp>,v1=<hex digest>` in the signature header. Verification
//! runs over the raw request bytes, before any parsing, with a
//! constant-time comparison.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Signature verification failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The header did not have the expected `t=...,v1=...` shape.
    #[error("malformed signature header")]
    Malformed,
    /// The digest did not match.
    #[error("signature mismatch")]
    Mismatch,
}

/// Verify a webhook signature header against the raw request body.
///
/// # Errors
///
/// Returns error if the header is malformed or the digest does not match.
pub fn verify_signature(
    secret: &str,
    raw_body: &[u8],
    header: &str,
) -> Result<(), SignatureError> {
    let (timestamp, signature_hex) = parse_header(header)?;
    let digest = hex::decode(signature_hex).map_err(|_| SignatureError::Malformed)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::Malformed)?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(raw_body);
    mac.verify_slice(&digest)
        .map_err(|_| SignatureError::Mismatch)
}

/// Produce a signature header for a payload. Used by tests and local
/// tooling to fabricate gateway deliveries.
#[must_use]
pub fn sign_payload(secret: &str, timestamp: &str, raw_body: &[u8]) -> String {
    #[allow(clippy::expect_used)]
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(raw_body);
    let digest = mac.finalize().into_bytes();
    format!("t={timestamp},v1={}", hex::encode(digest))
}

fn parse_header(header: &str) -> Result<(&str, &str), SignatureError> {
    let mut timestamp = None;
    let mut signature = None;
    for part in header.split(',') {
        match part.split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signature = Some(value),
            _ => {}
        }
    }
    match (timestamp, signature) {
        (Some(t), Some(v1)) if !t.is_empty() && !v1.is_empty() => Ok((t, v1)),
        _ => Err(SignatureError::Malformed),
    }
}
