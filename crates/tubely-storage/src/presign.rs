//! Short-lived read access to stored objects.

use crate::location::ObjectLocation;
use crate::traits::{Storage, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tubely_core::constants::DEFAULT_PRESIGNED_URL_EXPIRY_SECS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresignConfig {
    pub expiry: Duration,
}

impl Default for PresignConfig {
    fn default() -> Self {
        Self {
            expiry: Duration::from_secs(DEFAULT_PRESIGNED_URL_EXPIRY_SECS),
        }
    }
}

/// A presigned GET URL together with the object it grants access to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: String,
    pub location: ObjectLocation,
    pub expires_at: DateTime<Utc>,
}

/// Turns canonical object URLs into time-limited signed URLs.
///
/// Stored records keep the canonical URL; signing happens on every read, so
/// issuing never mutates anything.
#[derive(Clone)]
pub struct AccessUrlIssuer {
    storage: Arc<dyn Storage>,
    config: PresignConfig,
}

impl AccessUrlIssuer {
    pub fn new(storage: Arc<dyn Storage>, config: PresignConfig) -> Self {
        Self { storage, config }
    }

    pub async fn issue(&self, canonical_url: &str) -> StorageResult<SignedUrl> {
        let location = self.storage.locate(canonical_url)?;

        if location.bucket != self.storage.bucket() {
            return Err(StorageError::BucketMismatch {
                expected: self.storage.bucket().to_string(),
                found: location.bucket,
            });
        }

        let expires_in = chrono::Duration::from_std(self.config.expiry)
            .map_err(|e| StorageError::ConfigError(format!("Invalid presign expiry: {}", e)))?;
        let expires_at = Utc::now() + expires_in;

        let url = self
            .storage
            .presigned_get_url(&location.key, self.config.expiry)
            .await?;

        tracing::debug!(
            bucket = %location.bucket,
            key = %location.key,
            expires_at = %expires_at,
            "Issued presigned URL"
        );

        Ok(SignedUrl {
            url,
            location,
            expires_at,
        })
    }
}
