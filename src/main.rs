//! api-dispatcher - concurrent HTTP batch dispatcher

use std::sync::Arc;

use anyhow::{Context, Result};
use api_dispatcher::{server, write_report, Batch, Dispatcher, ReqwestTransport};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "api_dispatcher=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let client = cli.options.client_config()?.build_client()?;
    let dispatcher = Dispatcher::new(Arc::new(ReqwestTransport::new(client)), &cli.options.dispatch_config());

    match cli.command {
        Commands::Run { config } => {
            let batch = Batch::from_path(&config)
                .await
                .with_context(|| format!("Error loading config from {}", config.display()))?;
            tracing::info!(requests = batch.len(), "dispatching batch");

            let mut stdout = tokio::io::stdout();
            let written = write_report(dispatcher.dispatch_reported(&batch.requests), &mut stdout, cli.options.format)
                .await
                .context("failed to write outcomes")?;
            tracing::debug!(written, "batch complete");
        }
        Commands::Serve { addr, max_body_bytes } => {
            let config = cli.options.server_config(addr, max_body_bytes);
            let listener = server::bind(&config.addr).await?;
            server::serve(listener, server::app(dispatcher, &config), shutdown_signal()).await?;
        }
    }

    Ok(())
}
