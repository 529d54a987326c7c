//! Signed outbound calls to the internal agent service.

use std::time::Duration;

use anyhow::{bail, Context};
use apex_signing::{RequestSigner, SignatureError, SignedEnvelope};
use axum::body::Bytes;
use reqwest::{Client, Response};
use serde::de::IgnoredAny;
use thiserror::Error;

use crate::types::ProxyOperation;

const MIN_REQUEST_TIMEOUT_MS: u64 = 1_000;

#[derive(Debug, Error)]
/// Enumerates supported `UpstreamCallError` values.
pub enum UpstreamCallError {
    #[error("failed to sign agent service request: {0}")]
    Signing(#[from] SignatureError),
    #[error("agent service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("agent service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("agent service returned a non-JSON body: {0}")]
    InvalidBody(String),
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    stream_client: Client,
    base_url: String,
    signer: RequestSigner,
}

impl UpstreamClient {
    /// JSON calls get a total timeout; the stream client only bounds connection setup.
    pub fn new(
        base_url: &str,
        signer: RequestSigner,
        request_timeout_ms: u64,
        stream_connect_timeout_ms: u64,
    ) -> anyhow::Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            bail!("--agent-url must be provided");
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            bail!("--agent-url '{base_url}' must start with http:// or https://");
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(
                request_timeout_ms.max(MIN_REQUEST_TIMEOUT_MS),
            ))
            .build()
            .context("failed to construct reqwest client for agent service")?;
        let stream_client = Client::builder()
            .connect_timeout(Duration::from_millis(
                stream_connect_timeout_ms.max(MIN_REQUEST_TIMEOUT_MS),
            ))
            .build()
            .context("failed to construct streaming reqwest client for agent service")?;

        Ok(Self {
            client,
            stream_client,
            base_url: base_url.to_string(),
            signer,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }

    pub fn upstream_url(&self, operation: ProxyOperation) -> String {
        format!("{}{}", self.base_url, operation.upstream_path())
    }

    /// Sends a signed envelope and returns the 2xx reply bytes untouched once
    /// they are known to be well-formed JSON.
    pub async fn call_json(
        &self,
        operation: ProxyOperation,
        envelope: SignedEnvelope,
    ) -> Result<Bytes, UpstreamCallError> {
        let response = self.send_signed(&self.client, operation, envelope).await?;
        let body = response.bytes().await?;
        serde_json::from_slice::<IgnoredAny>(&body)
            .map_err(|error| UpstreamCallError::InvalidBody(error.to_string()))?;
        Ok(body)
    }

    /// Opens the upstream event stream. The body is left unread for the caller to pipe.
    pub async fn open_stream(
        &self,
        envelope: SignedEnvelope,
    ) -> Result<Response, UpstreamCallError> {
        self.send_signed(&self.stream_client, ProxyOperation::Stream, envelope)
            .await
    }

    async fn send_signed(
        &self,
        client: &Client,
        operation: ProxyOperation,
        envelope: SignedEnvelope,
    ) -> Result<Response, UpstreamCallError> {
        let mut request = client.request(operation.upstream_method(), self.upstream_url(operation));
        for (name, value) in envelope.headers() {
            request = request.header(name, value);
        }
        if envelope.has_body() {
            request = request.body(envelope.body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamCallError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}
