//! Storage abstraction trait
//!
//! This module defines the Storage trait that all object-store backends implement.

use crate::location::ObjectLocation;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Presign failed: {0}")]
    PresignFailed(String),

    #[error("Malformed storage location: {0}")]
    MalformedLocation(String),

    #[error("Location points at bucket {found}, expected {expected}")]
    BucketMismatch { expected: String, found: String },

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Implementations are bound to a single bucket. Every upload returns the canonical
/// (unsigned) URL of the object, and [`Storage::locate`] is its exact inverse.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload a local file under `storage_key` and return its canonical URL.
    ///
    /// The object is fully written when this returns `Ok`.
    async fn put_file(
        &self,
        storage_key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Upload an in-memory payload under `storage_key` and return its canonical URL.
    async fn put_bytes(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Decode a canonical URL produced by this backend back into bucket and key.
    fn locate(&self, canonical_url: &str) -> StorageResult<ObjectLocation>;

    /// Generate a presigned GET URL for `storage_key` valid for `expires_in`.
    async fn presigned_get_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Bucket this backend writes to.
    fn bucket(&self) -> &str;
}
