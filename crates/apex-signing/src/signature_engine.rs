//! HMAC-SHA256 over `"{timestamp}.{body}"`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::SignatureError;

type HmacSha256 = Hmac<Sha256>;

fn keyed_mac(secret: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
    if secret.is_empty() {
        return Err(SignatureError::EmptySecret);
    }
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|error| SignatureError::InvalidKey(error.to_string()))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    Ok(mac)
}

/// Computes the lowercase hex signature for `timestamp` and the exact `body` bytes.
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> Result<String, SignatureError> {
    let mac = keyed_mac(secret, timestamp, body)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Recomputes the signature and compares it against `signature` in constant time.
/// Only lowercase hex is accepted on the wire.
pub fn verify_signature(
    secret: &str,
    timestamp: &str,
    body: &[u8],
    signature: &str,
) -> Result<(), SignatureError> {
    let trimmed = signature.trim();
    if trimmed.is_empty() {
        return Err(SignatureError::MalformedSignature(
            "signature digest cannot be empty".to_string(),
        ));
    }
    if trimmed.bytes().any(|byte| byte.is_ascii_uppercase()) {
        return Err(SignatureError::MalformedSignature(
            "signature digest must be lowercase hex".to_string(),
        ));
    }
    let presented =
        hex::decode(trimmed).map_err(|error| SignatureError::MalformedSignature(error.to_string()))?;
    keyed_mac(secret, timestamp, body)?
        .verify_slice(&presented)
        .map_err(|_| SignatureError::Mismatch)
}
