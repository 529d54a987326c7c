//! Public gateway routes and the internal agent service paths they map to.

pub const GATEWAY_HEALTH_ENDPOINT: &str = "/gateway/health";
pub const AGENT_SEARCH_ENDPOINT: &str = "/api/agent/search";
pub const AGENT_INVOKE_ENDPOINT: &str = "/api/agent/invoke";
pub const AGENT_PARTNER_ENDPOINT: &str = "/api/agent/partner";
pub const AGENT_TASKS_ENDPOINT: &str = "/api/agent/tasks";
pub const AGENT_STREAM_ENDPOINT: &str = "/api/agent/stream";

pub const UPSTREAM_MEMORY_SEARCH_PATH: &str = "/memory/search";
pub const UPSTREAM_INVOKE_PATH: &str = "/invoke";
pub const UPSTREAM_PARTNER_PATH: &str = "/partner";
pub const UPSTREAM_TASKS_PATH: &str = "/tasks";
pub const UPSTREAM_STREAM_PATH: &str = "/stream";

pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";
