use clap::{ArgAction, Parser};

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "apex-gateway",
    about = "Signed request gateway in front of the internal agent service",
    version
)]
pub struct Cli {
    #[arg(
        long = "bind",
        env = "APEX_GATEWAY_BIND",
        default_value = "127.0.0.1:8790",
        help = "Socket address the gateway listens on"
    )]
    pub bind: String,

    #[arg(
        long = "agent-url",
        env = "AGENT_URL",
        default_value = "http://127.0.0.1:8000",
        help = "Base URL of the internal agent service"
    )]
    pub agent_url: String,

    #[arg(
        long = "shared-secret",
        env = "AGENT_SHARED_SECRET",
        hide_env_values = true,
        help = "Shared HMAC secret used to sign calls to the agent service"
    )]
    pub shared_secret: Option<String>,

    #[arg(
        long = "default-model",
        env = "OLLAMA_MODEL",
        default_value = "llama3",
        help = "Model forwarded on invoke when the caller does not name one"
    )]
    pub default_model: String,

    #[arg(
        long = "request-timeout-ms",
        env = "APEX_GATEWAY_TIMEOUT_MS",
        default_value_t = 30_000,
        value_parser = parse_positive_u64,
        help = "Total timeout for non-streaming agent service calls"
    )]
    pub request_timeout_ms: u64,

    #[arg(
        long = "stream-connect-timeout-ms",
        env = "APEX_GATEWAY_STREAM_CONNECT_TIMEOUT_MS",
        default_value_t = 10_000,
        value_parser = parse_positive_u64,
        help = "Connect timeout for the streaming route; streams themselves are not time-bounded"
    )]
    pub stream_connect_timeout_ms: u64,

    #[arg(
        long = "allow-insecure-secret",
        env = "APEX_ALLOW_INSECURE_SECRET",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Permit the 'change-me' placeholder secret (development only)"
    )]
    pub allow_insecure_secret: bool,
}
