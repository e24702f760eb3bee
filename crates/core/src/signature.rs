//! Webhook signature verification.
//!
//! The provider signs every webhook delivery with HMAC-SHA256 over the raw
//! request body and sends the hex digest in the `replicate-signature`
//! header, optionally prefixed with `sha256=`. Verification must run on the
//! raw, unparsed bytes; the comparison is constant-time via
//! [`hmac::Mac::verify_slice`].

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "replicate-signature";

/// Errors produced by signature verification.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Missing signature header")]
    Missing,

    #[error("Signature is not valid hex")]
    Malformed,

    #[error("Signature mismatch")]
    Mismatch,
}

/// Compute the hex HMAC-SHA256 signature for a payload.
///
/// Exposed so tests (and the client stub) can produce valid signatures.
pub fn sign(secret: &[u8], body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    let digest = mac.finalize().into_bytes();
    hex_encode(&digest)
}

/// Verify a webhook signature against the raw body.
///
/// `header` is the value of the `replicate-signature` header (or `None` when
/// absent). A `sha256=` prefix is stripped before decoding. The digest
/// comparison is constant-time.
pub fn verify(secret: &[u8], body: &[u8], header: Option<&str>) -> Result<(), SignatureError> {
    let header = header.ok_or(SignatureError::Missing)?;
    let hex = header.strip_prefix("sha256=").unwrap_or(header);

    let expected = hex_decode(hex).ok_or(SignatureError::Malformed)?;

    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 || s.is_empty() {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
