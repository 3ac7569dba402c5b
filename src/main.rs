// =============================================================================
// Optimist Trader — Main Entry Point
// =============================================================================
//
// Fetches six months of daily history for a fixed equity universe, computes
// price change, SMA(50/100/200), RSI(14) and a golden-crossover signal, and
// serves the resulting table over HTTP.  The data is refreshed once at
// startup and then daily at the configured local time.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod engine;
mod indicators;
mod market_data;
mod pipeline;
mod render;
mod runtime_config;
mod scheduler;
mod types;
mod yahoo;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::runtime_config::RuntimeConfig;
use crate::yahoo::YahooClient;

const DEFAULT_CONFIG_PATH: &str = "optimist_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Optimist.Trader...");

    let config_path =
        std::env::var("OPTIMIST_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let mut config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_env_overrides(|key| std::env::var(key).ok());

    let schedule_at = config.schedule_time()?;

    info!(symbols = ?config.symbols, "Configured stock universe");
    info!(
        at = %schedule_at,
        output = %config.output_path.display(),
        "Daily refresh configured"
    );

    // ── 2. Data source & shared state ────────────────────────────────────
    let source = Arc::new(YahooClient::new(
        &config.data_base_url,
        config.history_range.clone(),
    )?);
    let bind_addr = config.bind_addr.clone();
    let run_on_startup = config.run_on_startup;
    let state = Arc::new(AppState::new(config));

    // ── 3. Initial fetch so the page has content on first load ──────────
    if run_on_startup {
        pipeline::refresh(&*source, &state).await;
    }

    // ── 4. Daily scheduler ───────────────────────────────────────────────
    let sched_state = state.clone();
    let sched_source = source.clone();
    tokio::spawn(async move {
        scheduler::run_daily(schedule_at, move || {
            let state = sched_state.clone();
            let source = sched_source.clone();
            async move {
                pipeline::refresh(&*source, &state).await;
            }
        })
        .await;
    });
    info!("Scheduler started!");

    // ── 5. HTTP server ───────────────────────────────────────────────────
    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind HTTP server to {bind_addr}"))?;
    info!(addr = %bind_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Optimist.Trader stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
