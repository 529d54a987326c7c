//! Maps parsed CLI flags onto the gateway configuration and runs the server.

use anyhow::{anyhow, Result};
use apex_gateway::{run_signed_gateway, SignedGatewayConfig};

use crate::Cli;

/// Fails closed when no shared secret was supplied by flag or environment.
pub fn build_gateway_config(cli: &Cli) -> Result<SignedGatewayConfig> {
    let shared_secret = cli
        .shared_secret
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            anyhow!("--shared-secret (AGENT_SHARED_SECRET) is required to sign agent service calls")
        })?;

    Ok(SignedGatewayConfig {
        bind: cli.bind.clone(),
        upstream_base_url: cli.agent_url.clone(),
        shared_secret: shared_secret.to_string(),
        default_model: cli.default_model.clone(),
        request_timeout_ms: cli.request_timeout_ms,
        stream_connect_timeout_ms: cli.stream_connect_timeout_ms,
        allow_insecure_secret: cli.allow_insecure_secret,
    })
}

pub async fn run_gateway(cli: &Cli) -> Result<()> {
    let config = build_gateway_config(cli)?;
    run_signed_gateway(config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse_cli(args: &[&str]) -> Cli {
        let mut argv = vec!["apex-gateway"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("parse cli")
    }

    #[test]
    fn unit_build_gateway_config_copies_flags() {
        let cli = parse_cli(&[
            "--agent-url",
            "http://agent:8000",
            "--shared-secret",
            "s3cr3t",
            "--request-timeout-ms",
            "2500",
        ]);
        let config = build_gateway_config(&cli).expect("config");
        assert_eq!(config.upstream_base_url, "http://agent:8000");
        assert_eq!(config.shared_secret, "s3cr3t");
        assert_eq!(config.request_timeout_ms, 2_500);
        assert!(!config.allow_insecure_secret);
    }

    #[test]
    fn regression_build_gateway_config_requires_secret() {
        let mut cli = parse_cli(&[]);
        cli.shared_secret = None;
        let error = build_gateway_config(&cli).expect_err("missing secret must fail closed");
        assert!(error.to_string().contains("AGENT_SHARED_SECRET"));

        cli.shared_secret = Some("   ".to_string());
        build_gateway_config(&cli).expect_err("blank secret must fail closed");
    }

    #[tokio::test]
    async fn regression_run_gateway_rejects_placeholder_secret_before_binding() {
        let mut cli = parse_cli(&["--bind", "127.0.0.1:0"]);
        cli.shared_secret = Some("change-me".to_string());
        cli.allow_insecure_secret = false;
        let error = run_gateway(&cli).await.expect_err("placeholder secret");
        assert!(error.to_string().contains("placeholder"));
    }

    #[tokio::test]
    async fn regression_run_gateway_rejects_invalid_bind() {
        let mut cli = parse_cli(&["--bind", "not-an-address"]);
        cli.shared_secret = Some("s3cr3t".to_string());
        let error = run_gateway(&cli).await.expect_err("invalid bind");
        assert!(error.to_string().contains("invalid --bind"));
    }
}
