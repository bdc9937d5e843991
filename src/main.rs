// =============================================================================
// Equity Snapshot — Main Entry Point
// =============================================================================
//
// Two modes:
//   equity-snapshot              serve the REST API until Ctrl-C
//   equity-snapshot TCS INFY     print a text report per symbol and exit
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod analysis;
mod api;
mod app_state;
mod indicators;
mod market_data;
mod patterns;
mod report;
mod runtime_config;
mod snapshot;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::report::SnapshotReport;
use crate::runtime_config::{RuntimeConfig, DEFAULT_CONFIG_PATH};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("SNAPSHOT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_env_overrides();

    info!(
        exchange_suffix = %config.exchange_suffix,
        history_range = %config.history_range,
        option_chain = config.enable_option_chain,
        corporate_calendar = config.enable_corporate_calendar,
        "Equity snapshot service starting"
    );

    // ── 2. Build shared state ────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config)?);

    // ── 3. One-shot mode ─────────────────────────────────────────────────
    let symbols: Vec<String> = std::env::args().skip(1).collect();
    if !symbols.is_empty() {
        let today = chrono::Local::now().date_naive();
        for raw in &symbols {
            let Some(symbol) = api::rest::normalize_symbol(raw) else {
                error!(symbol = %raw, "Invalid symbol, skipping");
                continue;
            };
            match state.snapshots.build(&symbol).await {
                Ok(report) => println!("{}\n", SnapshotReport::new(&symbol, &report, today)),
                Err(e) => error!(symbol = %symbol, error = %e, "Snapshot failed"),
            }
        }
        return Ok(());
    }

    // ── 4. Start the API server ──────────────────────────────────────────
    let app = api::rest::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "API server failed");
        }
    });

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    let stats = state.stats();
    warn!(
        uptime_secs = stats.uptime_secs,
        requests_served = stats.requests_served,
        requests_failed = stats.requests_failed,
        "Shutdown signal received, stopping gracefully"
    );
    server.abort();

    if let Err(e) = state.runtime_config.read().save(&config_path) {
        error!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("Equity snapshot service shut down complete.");
    Ok(())
}
