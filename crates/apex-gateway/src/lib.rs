//! Signed request gateway between the public edge and the internal agent service.
//!
//! Inbound calls are validated, re-serialized once into their upstream wire
//! form, signed with the shared secret, and forwarded. JSON replies are
//! re-emitted; the streaming route pipes the upstream event stream through
//! unmodified.

pub mod endpoints;
pub mod gateway_config;
pub mod gateway_error;
pub mod proxy_routes;
pub mod server_bootstrap;
pub mod stream_relay;
pub mod types;
pub mod upstream_client;

pub use endpoints::*;
pub use gateway_config::{
    validate_shared_secret, SignedGatewayConfig, INSECURE_PLACEHOLDER_SECRET,
};
pub use gateway_error::{GatewayApiError, GatewayErrorKind};
pub use server_bootstrap::{build_signed_gateway_router, run_signed_gateway, SignedGatewayState};
pub use types::ProxyOperation;
pub use upstream_client::{UpstreamCallError, UpstreamClient};
