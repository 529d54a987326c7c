//! Receiving-side check for signed calls: header presence, freshness, then digest.

use std::fmt;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::request_signer::{HEADER_SIGNATURE, HEADER_TIMESTAMP};
use crate::signature_engine::verify_signature;
use crate::SignatureError;

/// Requests older or newer than five minutes are rejected.
pub const DEFAULT_MAX_SKEW_SECONDS: u64 = 300;

#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Arc<str>,
    max_skew_seconds: u64,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<redacted>")
            .field("max_skew_seconds", &self.max_skew_seconds)
            .finish_non_exhaustive()
    }
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Result<Self, SignatureError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(SignatureError::EmptySecret);
        }
        Ok(Self {
            secret: Arc::from(secret),
            max_skew_seconds: DEFAULT_MAX_SKEW_SECONDS,
            clock: Arc::new(SystemClock),
        })
    }

    /// A window of zero disables the freshness check.
    pub fn with_max_skew_seconds(mut self, max_skew_seconds: u64) -> Self {
        self.max_skew_seconds = max_skew_seconds;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn max_skew_seconds(&self) -> u64 {
        self.max_skew_seconds
    }

    /// Verifies raw header values against the raw request body bytes.
    pub fn verify(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<(), SignatureError> {
        let timestamp = timestamp
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(SignatureError::MissingHeader(HEADER_TIMESTAMP))?;
        let signature = signature
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(SignatureError::MissingHeader(HEADER_SIGNATURE))?;

        self.validate_timestamp_skew(timestamp)?;
        verify_signature(&self.secret, timestamp, body, signature)
    }

    fn validate_timestamp_skew(&self, timestamp: &str) -> Result<(), SignatureError> {
        let timestamp_seconds = timestamp
            .parse::<u64>()
            .map_err(|_| SignatureError::InvalidTimestamp(timestamp.to_string()))?;
        if self.max_skew_seconds == 0 {
            return Ok(());
        }
        let skew_seconds = self.clock.now_unix_seconds().abs_diff(timestamp_seconds);
        if skew_seconds > self.max_skew_seconds {
            return Err(SignatureError::StaleTimestamp {
                skew_seconds,
                max_skew_seconds: self.max_skew_seconds,
            });
        }
        Ok(())
    }
}
