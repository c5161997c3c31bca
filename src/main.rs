//! Neuroscan - Main Entry Point

use clap::Parser;
use neuroscan::cli::{cmd_patch_notebook, cmd_predict, cmd_report, cmd_serve, Cli, Commands};
use neuroscan::server::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neuroscan=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            cmd_serve(&host, port).await?;
        }
        Some(Commands::Predict {
            image,
            model,
            labels,
        }) => {
            cmd_predict(&image, &model, &labels)?;
        }
        Some(Commands::Report {
            image,
            output,
            model,
            labels,
            reference,
        }) => {
            cmd_report(&image, &output, &model, &labels, reference.as_ref())?;
        }
        Some(Commands::PatchNotebook {
            input,
            output,
            drive_path,
        }) => {
            cmd_patch_notebook(&input, &output, &drive_path)?;
        }
        None => {
            // Default: serve with environment-driven configuration.
            run_server(ServerConfig::default()).await?;
        }
    }

    Ok(())
}
