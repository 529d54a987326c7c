//! Startup configuration for the signed gateway.

use anyhow::{bail, Result};
use std::fmt;

/// Placeholder secret shipped in sample environments; never trusted silently.
pub const INSECURE_PLACEHOLDER_SECRET: &str = "change-me";

#[derive(Clone)]
/// Public struct `SignedGatewayConfig` used to start the gateway server.
pub struct SignedGatewayConfig {
    pub bind: String,
    pub upstream_base_url: String,
    pub shared_secret: String,
    pub default_model: String,
    pub request_timeout_ms: u64,
    pub stream_connect_timeout_ms: u64,
    pub allow_insecure_secret: bool,
}

impl Default for SignedGatewayConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8790".to_string(),
            upstream_base_url: "http://127.0.0.1:8000".to_string(),
            shared_secret: String::new(),
            default_model: "llama3".to_string(),
            request_timeout_ms: 30_000,
            stream_connect_timeout_ms: 10_000,
            allow_insecure_secret: false,
        }
    }
}

impl fmt::Debug for SignedGatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedGatewayConfig")
            .field("bind", &self.bind)
            .field("upstream_base_url", &self.upstream_base_url)
            .field("shared_secret", &"<redacted>")
            .field("default_model", &self.default_model)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("stream_connect_timeout_ms", &self.stream_connect_timeout_ms)
            .field("allow_insecure_secret", &self.allow_insecure_secret)
            .finish()
    }
}

/// Rejects an unset secret, and the placeholder secret unless explicitly allowed.
pub fn validate_shared_secret(secret: &str, allow_insecure_secret: bool) -> Result<()> {
    if secret.trim().is_empty() {
        bail!("--shared-secret (AGENT_SHARED_SECRET) must be provided");
    }
    if secret == INSECURE_PLACEHOLDER_SECRET {
        if !allow_insecure_secret {
            bail!(
                "--shared-secret is the placeholder '{INSECURE_PLACEHOLDER_SECRET}'; set a real secret or pass --allow-insecure-secret"
            );
        }
        tracing::warn!(
            "gateway is signing with the placeholder shared secret; do not run this in production"
        );
    }
    Ok(())
}
