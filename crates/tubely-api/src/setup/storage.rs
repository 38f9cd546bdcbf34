//! Storage setup and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_storage::{create_storage, Storage};

pub fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing object storage...");
    let storage = create_storage(config).context("Failed to initialize object storage")?;
    tracing::info!(
        bucket = %storage.bucket(),
        custom_endpoint = config.s3_endpoint.is_some(),
        "Object storage initialized successfully"
    );
    Ok(storage)
}
