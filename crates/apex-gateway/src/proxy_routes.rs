//! JSON proxy handlers: search, invoke, partner, and tasks.

use std::sync::Arc;
use std::time::Instant;

use apex_signing::SignedEnvelope;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::gateway_error::GatewayApiError;
use crate::server_bootstrap::SignedGatewayState;
use crate::types::{
    required_text, InvokeRequest, PartnerRequest, ProxyOperation, SearchRequest,
    UpstreamInvokePayload, UpstreamPartnerPayload, UpstreamSearchPayload, DEFAULT_SEARCH_LIMIT,
};
use crate::upstream_client::UpstreamCallError;

pub(crate) async fn handle_search(
    State(state): State<Arc<SignedGatewayState>>,
    body: Bytes,
) -> Result<Response, GatewayApiError> {
    let request: SearchRequest = parse_json_body(&body)?;
    let q = required_text(request.q.as_deref())
        .ok_or_else(|| GatewayApiError::validation("q is required"))?;
    let envelope = sign_payload(
        &state,
        &UpstreamSearchPayload {
            q,
            limit: request.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
        },
    )?;
    forward_json(&state, ProxyOperation::Search, envelope).await
}

pub(crate) async fn handle_invoke(
    State(state): State<Arc<SignedGatewayState>>,
    body: Bytes,
) -> Result<Response, GatewayApiError> {
    let request: InvokeRequest = parse_json_body(&body)?;
    let prompt = required_text(request.prompt.as_deref())
        .ok_or_else(|| GatewayApiError::validation("prompt is required"))?;
    let model = required_text(request.model.as_deref()).unwrap_or(state.default_model());
    let envelope = sign_payload(&state, &UpstreamInvokePayload { prompt, model })?;
    forward_json(&state, ProxyOperation::Invoke, envelope).await
}

pub(crate) async fn handle_partner(
    State(state): State<Arc<SignedGatewayState>>,
    body: Bytes,
) -> Result<Response, GatewayApiError> {
    let request: PartnerRequest = parse_json_body(&body)?;
    let instruction = required_text(request.instruction.as_deref())
        .ok_or_else(|| GatewayApiError::validation("instruction is required"))?;
    let envelope = sign_payload(&state, &UpstreamPartnerPayload { instruction })?;
    forward_json(&state, ProxyOperation::Partner, envelope).await
}

pub(crate) async fn handle_tasks(
    State(state): State<Arc<SignedGatewayState>>,
) -> Result<Response, GatewayApiError> {
    let envelope = state
        .upstream()
        .signer()
        .sign_empty()
        .map_err(UpstreamCallError::from)?;
    forward_json(&state, ProxyOperation::Tasks, envelope).await
}

/// An empty body parses as the default request so missing fields surface as validation errors.
pub(crate) fn parse_json_body<T: DeserializeOwned + Default>(
    body: &[u8],
) -> Result<T, GatewayApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|error| GatewayApiError::validation(format!("invalid JSON body: {error}")))
}

pub(crate) fn sign_payload<T: Serialize>(
    state: &SignedGatewayState,
    payload: &T,
) -> Result<SignedEnvelope, GatewayApiError> {
    state
        .upstream()
        .signer()
        .sign_json(payload)
        .map_err(|error| UpstreamCallError::from(error).into())
}

async fn forward_json(
    state: &SignedGatewayState,
    operation: ProxyOperation,
    envelope: SignedEnvelope,
) -> Result<Response, GatewayApiError> {
    let started = Instant::now();
    let request_bytes = envelope.body.len();
    let result = state.upstream().call_json(operation, envelope).await;
    let duration_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(body) => {
            info!(
                operation = operation.as_str(),
                upstream_path = operation.upstream_path(),
                request_bytes,
                response_bytes = body.len(),
                duration_ms,
                "agent service call succeeded"
            );
            Ok(([(CONTENT_TYPE, "application/json")], body).into_response())
        }
        Err(error) => {
            warn!(
                operation = operation.as_str(),
                upstream_path = operation.upstream_path(),
                request_bytes,
                duration_ms,
                error = %error,
                "agent service call failed"
            );
            Err(error.into())
        }
    }
}
