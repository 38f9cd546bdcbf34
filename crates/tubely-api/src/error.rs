//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`. Crate-level errors (`StorageError`,
//! `IngestError`) convert into it here, so every failure renders the same way.

use axum::{
    extract::multipart::MultipartError,
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use tubely_core::{AppError, ErrorMetadata, LogLevel};
use tubely_processing::{IngestError, StagingError};
use tubely_storage::StorageError;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
///
/// Needed because of the orphan rule: IntoResponse and AppError both live in other crates.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that answers malformed bodies with an ErrorResponse instead of plain text.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Details are hidden in production and for sensitive errors.
        let show_details = !is_production_env() && !app_error.is_sensitive();

        let body = Json(ErrorResponse {
            error: app_error.client_message(),
            details: show_details.then(|| app_error.detailed_message()),
            error_type: show_details.then(|| app_error.error_type().to_string()),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        });

        (status, body).into_response()
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::UploadFailed(msg) => AppError::Storage(msg),
            StorageError::PresignFailed(msg) => AppError::Storage(msg),
            StorageError::MalformedLocation(msg) => AppError::MalformedLocation(msg),
            err @ StorageError::BucketMismatch { .. } => AppError::MalformedLocation(err.to_string()),
            StorageError::UnsupportedContentType(msg) => AppError::InvalidInput(msg),
            StorageError::InvalidKey(msg) => AppError::MalformedLocation(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}

/// Multipart streams fail with 413 once the route's body limit is hit.
fn is_body_limit_error(err: &(dyn std::error::Error + Send + Sync + 'static)) -> bool {
    err.downcast_ref::<MultipartError>()
        .is_some_and(|e| e.status() == StatusCode::PAYLOAD_TOO_LARGE)
}

impl From<IngestError> for HttpAppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Staging(StagingError::Read(ref source))
                if is_body_limit_error(source.as_ref()) =>
            {
                HttpAppError(AppError::PayloadTooLarge(
                    "Upload exceeds the request size limit".to_string(),
                ))
            }
            other => HttpAppError(AppError::from(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_storage_error_upload_failed() {
        let HttpAppError(app_err) = StorageError::UploadFailed("reset".to_string()).into();
        match app_err {
            AppError::Storage(msg) => assert_eq!(msg, "reset"),
            other => panic!("Expected Storage variant, got {:?}", other),
        }
    }

    #[test]
    fn test_from_storage_error_location_errors() {
        let HttpAppError(app_err) = StorageError::MalformedLocation("no key".to_string()).into();
        assert_eq!(app_err.error_code(), "LOCATION_FORMAT_ERROR");

        let HttpAppError(app_err) = StorageError::BucketMismatch {
            expected: "tubely".to_string(),
            found: "other".to_string(),
        }
        .into();
        assert_eq!(app_err.error_code(), "LOCATION_FORMAT_ERROR");
    }

    #[test]
    fn test_from_ingest_error_keeps_taxonomy() {
        let HttpAppError(app_err) =
            IngestError::UnsupportedContentType("video/avi".to_string()).into();
        assert_eq!(app_err.http_status_code(), 400);

        let HttpAppError(app_err) = IngestError::Staging(StagingError::TooLarge { limit: 1 }).into();
        assert_eq!(app_err.http_status_code(), 413);
    }

    #[test]
    fn test_unrelated_read_error_is_bad_request() {
        let source = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let HttpAppError(app_err) =
            IngestError::Staging(StagingError::Read(Box::new(source))).into();
        assert_eq!(app_err.http_status_code(), 400);
    }
}
