//! Streaming route: one signed upstream call, body piped through unmodified.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue};
use axum::response::Response;
use futures_util::StreamExt;
use tracing::{info, warn};

use crate::endpoints::EVENT_STREAM_CONTENT_TYPE;
use crate::gateway_error::GatewayApiError;
use crate::proxy_routes::sign_payload;
use crate::server_bootstrap::SignedGatewayState;
use crate::types::{required_text, ProxyOperation, StreamQuery, UpstreamStreamPayload};

pub(crate) async fn handle_stream(
    State(state): State<Arc<SignedGatewayState>>,
    query: Result<Query<StreamQuery>, QueryRejection>,
) -> Result<Response, GatewayApiError> {
    let Query(query) = query.map_err(|rejection| {
        GatewayApiError::validation(format!("invalid query string: {}", rejection.body_text()))
    })?;
    let prompt = required_text(query.prompt.as_deref())
        .ok_or_else(|| GatewayApiError::validation("prompt query parameter is required"))?;
    let envelope = sign_payload(
        &state,
        &UpstreamStreamPayload {
            prompt,
            model: required_text(query.model.as_deref()),
        },
    )?;

    let upstream = match state.upstream().open_stream(envelope).await {
        Ok(response) => response,
        Err(error) => {
            warn!(
                operation = ProxyOperation::Stream.as_str(),
                error = %error,
                "agent service stream failed to open"
            );
            return Err(error.into());
        }
    };
    info!(
        operation = ProxyOperation::Stream.as_str(),
        status = upstream.status().as_u16(),
        "agent service stream opened"
    );
    Ok(relay_event_stream(upstream))
}

/// Pipes the upstream body chunk-by-chunk. Dropping the returned body (caller
/// disconnect) drops the upstream response and releases its connection.
pub(crate) fn relay_event_stream(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let chunks = upstream.bytes_stream().inspect(|chunk| {
        if let Err(error) = chunk {
            warn!(error = %error, "agent service stream terminated mid-flight");
        }
    });

    let mut response = Response::new(Body::from_stream(chunks));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(EVENT_STREAM_CONTENT_TYPE),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(
        HeaderName::from_static("x-accel-buffering"),
        HeaderValue::from_static("no"),
    );
    response
}
