//! Gateway state, router wiring, and server lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use apex_signing::RequestSigner;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::info;

use crate::endpoints::{
    AGENT_INVOKE_ENDPOINT, AGENT_PARTNER_ENDPOINT, AGENT_SEARCH_ENDPOINT, AGENT_STREAM_ENDPOINT,
    AGENT_TASKS_ENDPOINT, GATEWAY_HEALTH_ENDPOINT,
};
use crate::gateway_config::{validate_shared_secret, SignedGatewayConfig};
use crate::proxy_routes::{handle_invoke, handle_partner, handle_search, handle_tasks};
use crate::stream_relay::handle_stream;
use crate::upstream_client::UpstreamClient;

#[derive(Debug)]
/// Read-only state shared by every request task.
pub struct SignedGatewayState {
    upstream: UpstreamClient,
    default_model: String,
}

impl SignedGatewayState {
    pub fn from_config(config: &SignedGatewayConfig) -> Result<Self> {
        validate_shared_secret(&config.shared_secret, config.allow_insecure_secret)?;
        let signer = RequestSigner::new(config.shared_secret.clone())
            .context("failed to initialize request signer")?;
        let upstream = UpstreamClient::new(
            &config.upstream_base_url,
            signer,
            config.request_timeout_ms,
            config.stream_connect_timeout_ms,
        )?;
        Self::new(upstream, &config.default_model)
    }

    pub fn new(upstream: UpstreamClient, default_model: &str) -> Result<Self> {
        let default_model = default_model.trim();
        if default_model.is_empty() {
            bail!("--default-model cannot be empty");
        }
        Ok(Self {
            upstream,
            default_model: default_model.to_string(),
        })
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }
}

/// Run the signed gateway until ctrl-c.
pub async fn run_signed_gateway(config: SignedGatewayConfig) -> Result<()> {
    let bind_addr: SocketAddr = config
        .bind
        .parse()
        .with_context(|| format!("invalid --bind '{}': expected host:port", config.bind))?;
    let state = Arc::new(SignedGatewayState::from_config(&config)?);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind signed gateway on {bind_addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve signed gateway listen address")?;

    info!(
        addr = %local_addr,
        upstream = state.upstream().base_url(),
        default_model = state.default_model(),
        "signed gateway listening"
    );

    let app = build_signed_gateway_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("signed gateway server exited unexpectedly")?;
    info!("signed gateway stopped");
    Ok(())
}

pub fn build_signed_gateway_router(state: Arc<SignedGatewayState>) -> Router {
    Router::new()
        .route(GATEWAY_HEALTH_ENDPOINT, get(handle_health))
        .route(AGENT_SEARCH_ENDPOINT, post(handle_search))
        .route(AGENT_INVOKE_ENDPOINT, post(handle_invoke))
        .route(AGENT_PARTNER_ENDPOINT, post(handle_partner))
        .route(AGENT_TASKS_ENDPOINT, get(handle_tasks))
        .route(AGENT_STREAM_ENDPOINT, get(handle_stream))
        .with_state(state)
}

async fn handle_health(State(state): State<Arc<SignedGatewayState>>) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ready",
            "upstream_base_url": state.upstream().base_url(),
            "default_model": state.default_model(),
            "routes": [
                AGENT_SEARCH_ENDPOINT,
                AGENT_INVOKE_ENDPOINT,
                AGENT_PARTNER_ENDPOINT,
                AGENT_TASKS_ENDPOINT,
                AGENT_STREAM_ENDPOINT,
            ],
        })),
    )
        .into_response()
}
