//! PR Reviewer Service - team pull request tracking with randomized reviewer
//! assignment.
//!
//! This is the main library for the service, exposing the assignment engine,
//! the directory services and the HTTP API built on top of them.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod server;
pub mod services;

use anyhow::Context;
use config::Config;
use services::ReviewerSelector;

/// Run the service until Ctrl-C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    log::info!("[app] Opening database at {}", config.database_path.display());

    let pool = db::initialize(&config.database_path, config.database_max_connections)
        .await
        .context("Failed to initialize database")?;

    let selector = match config.assignment_seed {
        Some(seed) => {
            log::info!("[app] Reviewer selection seeded with {}", seed);
            ReviewerSelector::seeded(seed)
        }
        None => ReviewerSelector::from_entropy(),
    };

    let state = api::AppState::new(pool.clone(), selector);
    let handle = server::start(config.http_addr, api::router(state))
        .await
        .with_context(|| format!("Failed to bind {}", config.http_addr))?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    log::info!("[app] Shutdown requested");

    handle.shutdown(config.shutdown_timeout).await;
    pool.close().await;

    log::info!("[app] Stopped");
    Ok(())
}
