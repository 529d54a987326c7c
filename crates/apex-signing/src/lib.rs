//! Shared-secret request signing for trusted internal hops.
//!
//! Every signed call carries an `x-timestamp` header and an `x-signature`
//! header holding the lowercase hex HMAC-SHA256 of `"{timestamp}.{body}"`.
//! The sending side builds a [`SignedEnvelope`] through [`RequestSigner`];
//! the receiving side checks it with [`SignatureVerifier`].

pub mod clock;
pub mod request_signer;
pub mod signature_engine;
pub mod signature_verifier;

pub use clock::{Clock, FixedClock, SystemClock};
pub use request_signer::{
    build_signed_headers, build_signed_headers_at, RequestSigner, SignedEnvelope,
    HEADER_SIGNATURE, HEADER_TIMESTAMP,
};
pub use signature_engine::{sign, verify_signature};
pub use signature_verifier::{SignatureVerifier, DEFAULT_MAX_SKEW_SECONDS};

use thiserror::Error;

#[derive(Debug, Error)]
/// Enumerates supported `SignatureError` values.
pub enum SignatureError {
    #[error("shared signing secret cannot be empty")]
    EmptySecret,
    #[error("failed to initialize request HMAC: {0}")]
    InvalidKey(String),
    #[error("failed to serialize signed payload: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("missing required header '{0}'")]
    MissingHeader(&'static str),
    #[error("invalid signature timestamp '{0}'")]
    InvalidTimestamp(String),
    #[error("signature timestamp skew {skew_seconds}s exceeds max {max_skew_seconds}s")]
    StaleTimestamp {
        skew_seconds: u64,
        max_skew_seconds: u64,
    },
    #[error("malformed signature digest: {0}")]
    MalformedSignature(String),
    #[error("signature verification failed")]
    Mismatch,
}
