use anyhow::Result;
use apex_cli::bootstrap_helpers::init_tracing;
use apex_cli::{run_gateway, Cli};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run_gateway(&cli).await
}
