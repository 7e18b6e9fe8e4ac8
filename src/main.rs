// =============================================================================
// Stock Analyzer: Main Entry Point
// =============================================================================
//
// Starts the REST API by default. `quote`, `extract` and `analyze` run a single
// command against the same collaborators and exit.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod analysis;
mod api;
mod app_state;
mod cli;
mod documents;
mod export;
mod indicators;
mod market_data;
mod runtime_config;
mod symbols;
mod types;
mod yahoo;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::cli::{Cli, Command};
use crate::runtime_config::RuntimeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = RuntimeConfig::load(&cli.config).unwrap_or_else(|e| {
        warn!(error = %e, path = %cli.config.display(), "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_env_overrides();

    info!(
        sma_period = config.sma_period,
        atr_period = config.atr_period,
        lookback_days = config.lookback_days,
        quote_base_url = %config.quote_base_url,
        "Configuration loaded"
    );

    // ── 2. Shared state ──────────────────────────────────────────────────
    let state = AppState::from_config(config)?;

    // ── 3. Dispatch ──────────────────────────────────────────────────────
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(Arc::new(state)).await,
        Command::Quote { ticker } => cli::run_quote(&state, &ticker).await,
        Command::Extract { file } => cli::run_extract(&state, &file),
        Command::Analyze { file, tickers, csv } => {
            cli::run_analyze(&state, file.as_deref(), tickers.as_deref(), csv.as_deref()).await
        }
    }
}

async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let bind_addr = state.config.bind_addr.clone();
    let app = api::rest::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("API server failed")
}
