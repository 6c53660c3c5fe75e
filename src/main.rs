use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dexroute::app;
use dexroute::application::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // --log-level > RUST_LOG > info
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    app::run(cli).await
}
