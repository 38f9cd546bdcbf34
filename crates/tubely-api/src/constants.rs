//! API constants

/// API base path prefix
pub const API_PREFIX: &str = "/api";

/// Headroom on top of the upload limit for multipart framing and the other form fields.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
