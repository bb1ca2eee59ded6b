//! Review Scheduler HTTP Server Binary
//!
//! This is the main entry point for the review scheduling REST API server.
//! It loads configuration, initializes the repository, sets up the HTTP router,
//! and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Run with the in-memory repository and built-in defaults
//! cargo run --bin review-server
//!
//! # Run against a config file and a directory snapshot
//! SCHEDULER_CONFIG=backend/scheduler.toml SCHEDULER_SEED=backend/seed/demo.json \
//!   cargo run --bin review-server
//! ```
//!
//! # Environment Variables
//!
//! - `SCHEDULER_CONFIG`: Path to the TOML configuration file
//! - `SCHEDULER_SEED`: JSON directory snapshot loaded into the store
//! - `REPOSITORY_TYPE`: Store backend (default: local)
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `RUST_LOG`: Log filter (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use review_scheduler::config::SchedulerConfig;
use review_scheduler::db;
use review_scheduler::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting review scheduler HTTP server");

    let config = SchedulerConfig::load().map_err(|e| anyhow::anyhow!(e))?;

    // Initialize global repository once and reuse it across the app
    db::init_repository(&config.repository)?;
    let repository = Arc::clone(db::get_repository()?);
    info!("Repository initialized successfully");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // Create application state
    let state = AppState::with_config(repository, config);

    // Create router with all endpoints
    let app = create_router(state);

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
