//! Credit Risk Model Service - Main Entry Point
//!
//! Serves a pre-trained credit risk classifier over HTTP, or scores records
//! from the command line.

use clap::Parser;
use credit_risk_service::cli::{cmd_info, cmd_predict, cmd_serve, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credit_risk_service=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            cmd_serve(host, port).await?;
        }
        Some(Commands::Predict { payload }) => {
            cmd_predict(&payload)?;
        }
        Some(Commands::Info) => {
            cmd_info()?;
        }
        None => {
            cmd_serve(None, None).await?;
        }
    }

    Ok(())
}
