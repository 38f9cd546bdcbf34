//! Application setup and initialization
//!
//! Everything main.rs needs to go from a loaded `Config` to a servable router.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(&config.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment,
        "Configuration loaded and validated successfully"
    );

    tokio::fs::create_dir_all(&config.scratch_dir)
        .await
        .with_context(|| format!("Failed to create scratch dir {}", config.scratch_dir.display()))?;

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config)?;

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(VideoRepository::new(pool)),
        storage,
    ));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
