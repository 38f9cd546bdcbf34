//! Common utilities for multipart upload handlers

use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use tubely_core::AppError;

/// Map a multipart read failure, keeping body-limit rejections as 413.
pub fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Upload exceeds the request size limit: {}", err))
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err))
    }
}

/// The declared media type of a file field. A missing header is a client error.
pub fn field_content_type(field: &Field<'_>) -> Result<String, AppError> {
    let content_type = field
        .content_type()
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing Content-Type for file".to_string()))?;

    if !content_type.contains('/') {
        return Err(AppError::InvalidInput(format!(
            "Invalid Content-Type: {}",
            content_type
        )));
    }
    Ok(content_type.to_string())
}

/// Buffer a field in memory, failing as soon as it grows past `limit` bytes.
pub async fn read_field_limited(mut field: Field<'_>, limit: usize) -> Result<Bytes, AppError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if buf.len() + chunk.len() > limit {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the {} byte limit",
                limit
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}
