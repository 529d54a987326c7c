//! Inbound request bodies and the upstream payloads they are rewritten into.

use axum::http::Method;
use serde::{Deserialize, Serialize};

use crate::endpoints::{
    UPSTREAM_INVOKE_PATH, UPSTREAM_MEMORY_SEARCH_PATH, UPSTREAM_PARTNER_PATH,
    UPSTREAM_STREAM_PATH, UPSTREAM_TASKS_PATH,
};

/// Memory search page size the agent service applies when none is given.
pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Logical operation forwarded to the internal agent service.
pub enum ProxyOperation {
    Search,
    Invoke,
    Partner,
    Tasks,
    Stream,
}

impl ProxyOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Invoke => "invoke",
            Self::Partner => "partner",
            Self::Tasks => "tasks",
            Self::Stream => "stream",
        }
    }

    pub fn upstream_path(self) -> &'static str {
        match self {
            Self::Search => UPSTREAM_MEMORY_SEARCH_PATH,
            Self::Invoke => UPSTREAM_INVOKE_PATH,
            Self::Partner => UPSTREAM_PARTNER_PATH,
            Self::Tasks => UPSTREAM_TASKS_PATH,
            Self::Stream => UPSTREAM_STREAM_PATH,
        }
    }

    pub fn upstream_method(self) -> Method {
        match self {
            Self::Tasks => Method::GET,
            Self::Search | Self::Invoke | Self::Partner | Self::Stream => Method::POST,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchRequest {
    #[serde(default, alias = "query")]
    pub(crate) q: Option<String>,
    #[serde(default)]
    pub(crate) limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct InvokeRequest {
    #[serde(default)]
    pub(crate) prompt: Option<String>,
    #[serde(default)]
    pub(crate) model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PartnerRequest {
    #[serde(default)]
    pub(crate) instruction: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StreamQuery {
    #[serde(default)]
    pub(crate) prompt: Option<String>,
    #[serde(default)]
    pub(crate) model: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpstreamSearchPayload<'a> {
    pub(crate) q: &'a str,
    pub(crate) limit: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpstreamInvokePayload<'a> {
    pub(crate) prompt: &'a str,
    pub(crate) model: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpstreamPartnerPayload<'a> {
    pub(crate) instruction: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpstreamStreamPayload<'a> {
    pub(crate) prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) model: Option<&'a str>,
}

/// Returns the value untouched when present and not blank.
pub(crate) fn required_text(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
