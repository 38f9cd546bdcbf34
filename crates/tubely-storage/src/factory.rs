use crate::{S3Config, S3Storage, Storage, StorageError, StorageResult};
use std::sync::Arc;
use tubely_core::Config;

/// Create the storage backend described by the configuration
pub fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    if config.s3_bucket.trim().is_empty() {
        return Err(StorageError::ConfigError(
            "S3_BUCKET not configured".to_string(),
        ));
    }
    if config.s3_region.trim().is_empty() {
        return Err(StorageError::ConfigError(
            "S3_REGION or AWS_REGION not configured".to_string(),
        ));
    }

    let storage = S3Storage::new(S3Config {
        bucket: config.s3_bucket.clone(),
        region: config.s3_region.clone(),
        endpoint_url: config.s3_endpoint.clone(),
        access_key_id: config.aws_access_key_id.clone(),
        secret_access_key: config.aws_secret_access_key.clone(),
        max_retries: config.s3_max_retries,
    })?;

    tracing::info!(
        bucket = %config.s3_bucket,
        region = %config.s3_region,
        endpoint = ?config.s3_endpoint,
        "S3 storage initialized"
    );

    Ok(Arc::new(storage))
}
