//! Tubely Storage Library
//!
//! Object-store access for published media: the [`Storage`] trait, its S3
//! implementation, object-key generation, canonical URL handling and the
//! [`AccessUrlIssuer`] that turns canonical URLs into short-lived signed ones.
//!
//! # Key format
//!
//! Video keys are `{category}/{random_id}.{extension}` where `random_id` is 32 random
//! bytes encoded as unpadded URL-safe base64. Thumbnails use the `thumbnails/` prefix.
//! Keys never start with `/` and never contain `..`.
//!
//! # Canonical URLs
//!
//! A stored object is referenced by exactly one URL form, built and parsed by
//! [`CanonicalUrls`]: `https://{bucket}.s3.{region}.amazonaws.com/{key}`, or
//! `{endpoint}/{bucket}/{key}` when a custom S3-compatible endpoint is configured.

pub mod factory;
pub mod keys;
pub mod location;
pub mod presign;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use location::{CanonicalUrls, ObjectLocation};
pub use presign::{AccessUrlIssuer, PresignConfig, SignedUrl};
pub use s3::{S3Config, S3Storage};
pub use traits::{Storage, StorageError, StorageResult};
