//! CLI flags and startup wiring for the signed gateway binary.

pub mod bootstrap_helpers;
pub mod cli_args;
pub mod gateway_runtime;

pub use cli_args::Cli;
pub use gateway_runtime::{build_gateway_config, run_gateway};
