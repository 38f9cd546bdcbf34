//! Shared constants

/// Bytes per megabyte, used when converting `*_SIZE_MB` settings.
pub const BYTES_PER_MB: usize = 1024 * 1024;

/// Default ceiling for a single video upload (1 GiB).
pub const DEFAULT_MAX_VIDEO_SIZE_MB: usize = 1024;

/// Default ceiling for a single thumbnail upload.
pub const DEFAULT_MAX_THUMBNAIL_SIZE_MB: usize = 10;

/// Default validity window for issued access URLs.
pub const DEFAULT_PRESIGNED_URL_EXPIRY_SECS: u64 = 3600;

/// Object-key namespace for thumbnails.
pub const THUMBNAIL_PREFIX: &str = "thumbnails";

/// Issuer claim stamped on access tokens.
pub const JWT_ISSUER: &str = "tubely-access";
