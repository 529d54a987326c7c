//! Outgoing signed envelope construction.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::signature_engine::sign;
use crate::SignatureError;

pub const HEADER_TIMESTAMP: &str = "x-timestamp";
pub const HEADER_SIGNATURE: &str = "x-signature";
const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq)]
/// One signed outbound body. Built per call and never reused.
pub struct SignedEnvelope {
    pub timestamp: u64,
    pub body: Vec<u8>,
    pub signature: String,
}

impl SignedEnvelope {
    pub fn timestamp_header(&self) -> String {
        self.timestamp.to_string()
    }

    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    /// Header pairs the receiving side expects on this call.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            (HEADER_TIMESTAMP, self.timestamp_header()),
            (HEADER_SIGNATURE, self.signature.clone()),
        ];
        if self.has_body() {
            headers.push(("content-type", JSON_CONTENT_TYPE.to_string()));
        }
        headers
    }
}

/// Signs `body` at the current wall-clock second.
pub fn build_signed_headers(secret: &str, body: &[u8]) -> Result<SignedEnvelope, SignatureError> {
    build_signed_headers_at(secret, SystemClock.now_unix_seconds(), body)
}

/// Signs `body` at a caller-supplied timestamp.
pub fn build_signed_headers_at(
    secret: &str,
    timestamp: u64,
    body: &[u8],
) -> Result<SignedEnvelope, SignatureError> {
    let signature = sign(secret, &timestamp.to_string(), body)?;
    Ok(SignedEnvelope {
        timestamp,
        body: body.to_vec(),
        signature,
    })
}

#[derive(Clone)]
/// Holds the process-wide secret and the clock used to stamp each call.
pub struct RequestSigner {
    secret: Arc<str>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("secret", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl RequestSigner {
    pub fn new(secret: impl Into<String>) -> Result<Self, SignatureError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(SignatureError::EmptySecret);
        }
        Ok(Self {
            secret: Arc::from(secret),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Signs already-serialized wire bytes. The returned envelope owns exactly those bytes.
    pub fn sign_bytes(&self, body: Vec<u8>) -> Result<SignedEnvelope, SignatureError> {
        let timestamp = self.clock.now_unix_seconds();
        let signature = sign(&self.secret, &timestamp.to_string(), &body)?;
        Ok(SignedEnvelope {
            timestamp,
            body,
            signature,
        })
    }

    /// Serializes `payload` once and signs the resulting bytes.
    pub fn sign_json<T: Serialize + ?Sized>(
        &self,
        payload: &T,
    ) -> Result<SignedEnvelope, SignatureError> {
        let body = serde_json::to_vec(payload)?;
        self.sign_bytes(body)
    }

    /// Body-less calls sign the empty string so the timestamp is still bound.
    pub fn sign_empty(&self) -> Result<SignedEnvelope, SignatureError> {
        self.sign_bytes(Vec::new())
    }
}
