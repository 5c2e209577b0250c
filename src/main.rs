//! Mathdrill · Arithmetic Worksheet Backend
//!
//! - Constrained problem generation (validation gate, rejection sampling, outcome classification)
//! - Axum HTTP + WebSocket API
//! - Static frontend fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                    : u16 (default 3000)
//!   MATHDRILL_CONFIG_PATH   : path to TOML config (defaults, presets, store path, seed)
//!   MATHDRILL_SETTINGS_PATH : TOML file persisting the current settings (in-memory if unset)
//!   MATHDRILL_SEED          : u64; makes every generation replay the same draws
//!   LOG_LEVEL               : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT              : "pretty" (default) or "json"

mod telemetry;
mod domain;
mod messages;
mod validation;
mod eval;
mod random;
mod generator;
mod outcome;
mod store;
mod config;
mod presets;
mod state;
mod logic;
mod protocol;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    // Shared state: current settings, store, presets.
    let state = Arc::new(AppState::new());

    let app = build_router(state.clone());

    // Read port from env or default to 3000.
    let addr: SocketAddr = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

    let listener = TcpListener::bind(addr).await?;
    info!(target: "mathdrill_backend", %addr, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(target: "mathdrill_backend", error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(target: "mathdrill_backend", "Shutdown signal received");
}
