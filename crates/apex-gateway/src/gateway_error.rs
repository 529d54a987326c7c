//! Caller-facing error envelope: `{"error": "<message>"}` with a mapped status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::upstream_client::UpstreamCallError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `GatewayErrorKind` values.
pub enum GatewayErrorKind {
    Validation,
    Upstream,
    Transport,
    Internal,
}

impl GatewayErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Upstream => StatusCode::BAD_GATEWAY,
            Self::Transport | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::Upstream => "upstream_error",
            Self::Transport => "transport_error",
            Self::Internal => "internal_error",
        }
    }
}

#[derive(Debug)]
pub struct GatewayApiError {
    pub kind: GatewayErrorKind,
    pub message: String,
}

impl GatewayApiError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Validation, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Upstream, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Transport, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Internal, message)
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }
}

impl From<UpstreamCallError> for GatewayApiError {
    fn from(error: UpstreamCallError) -> Self {
        let kind = match &error {
            UpstreamCallError::Status { .. } | UpstreamCallError::InvalidBody(_) => {
                GatewayErrorKind::Upstream
            }
            UpstreamCallError::Transport(_) => GatewayErrorKind::Transport,
            UpstreamCallError::Signing(_) => GatewayErrorKind::Internal,
        };
        Self::new(kind, error.to_string())
    }
}

impl IntoResponse for GatewayApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message }))).into_response()
    }
}
