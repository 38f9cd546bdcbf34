use crate::staging::StagingError;
use crate::video::{ProbeError, RemuxError};
use thiserror::Error;
use tubely_core::AppError;
use tubely_storage::StorageError;

/// Failure of a single upload, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported media type: {0}")]
    UnsupportedContentType(String),

    #[error("Upload exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Remux(#[from] RemuxError),

    /// The object store rejected the put. Nothing was recorded.
    #[error("Failed to store upload: {0}")]
    Storage(#[source] StorageError),

    /// The object is durable at `location` but the record still has its old value.
    #[error("Stored upload at {location} but failed to update its record: {source}")]
    RecordNotUpdated {
        location: String,
        #[source]
        source: AppError,
    },
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::UnsupportedContentType(msg) => AppError::InvalidInput(msg),
            IngestError::TooLarge { limit } => {
                AppError::PayloadTooLarge(format!("Upload exceeds the {} byte limit", limit))
            }
            IngestError::Staging(StagingError::TooLarge { limit }) => {
                AppError::PayloadTooLarge(format!("Upload exceeds the {} byte limit", limit))
            }
            IngestError::Staging(StagingError::Read(e)) => {
                AppError::InvalidInput(format!("Failed to read upload: {}", e))
            }
            IngestError::Staging(StagingError::Io(e)) => {
                AppError::Internal(format!("Failed to stage upload: {}", e))
            }
            IngestError::Probe(e) => AppError::MediaProcessing(e.to_string()),
            IngestError::Remux(e) => AppError::MediaProcessing(e.to_string()),
            IngestError::Storage(e) => AppError::Storage(e.to_string()),
            IngestError::RecordNotUpdated { location, source } => AppError::RecordNotUpdated {
                location,
                message: source.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubely_core::ErrorMetadata;

    #[test]
    fn test_stage_failures_map_to_taxonomy() {
        let cases: Vec<(IngestError, u16)> = vec![
            (IngestError::UnsupportedContentType("video/avi".into()), 400),
            (StagingError::TooLarge { limit: 10 }.into(), 413),
            (ProbeError::NoStreamsFound.into(), 400),
            (
                IngestError::Storage(StorageError::UploadFailed("reset".into())),
                502,
            ),
            (
                IngestError::RecordNotUpdated {
                    location: "https://b.s3.us-east-1.amazonaws.com/other/k.mp4".into(),
                    source: AppError::Database("gone".into()),
                },
                500,
            ),
        ];

        for (err, status) in cases {
            let msg = err.to_string();
            assert_eq!(AppError::from(err).http_status_code(), status, "{}", msg);
        }
    }

    #[test]
    fn test_record_not_updated_keeps_location() {
        let err = AppError::from(IngestError::RecordNotUpdated {
            location: "https://b.s3.us-east-1.amazonaws.com/landscape/k.mp4".into(),
            source: AppError::Database("gone".into()),
        });
        match err {
            AppError::RecordNotUpdated { location, .. } => {
                assert!(location.ends_with("landscape/k.mp4"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
