//! `ridematch-auth` entry point.

#![forbid(unsafe_code)]

use clap::Parser;

use ridematch_api::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ridematch=debug,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = cli.run().await {
        tracing::error!("{e}");
        return Err(e.into());
    }
    Ok(())
}
