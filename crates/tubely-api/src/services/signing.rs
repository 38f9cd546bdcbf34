//! Signing stored video records for delivery.

use tubely_core::Video;
use tubely_storage::AccessUrlIssuer;

use crate::error::HttpAppError;

/// Replace the canonical media URLs on `video` with short-lived signed ones.
///
/// Only the returned copy is signed; the stored record keeps its canonical URLs.
pub async fn sign_video(issuer: &AccessUrlIssuer, mut video: Video) -> Result<Video, HttpAppError> {
    if let Some(canonical) = video.video_url.take() {
        let signed = issuer.issue(&canonical).await?;
        tracing::debug!(video_id = %video.id, expires_at = %signed.expires_at, "Signed video URL");
        video.video_url = Some(signed.url);
    }
    if let Some(canonical) = video.thumbnail_url.take() {
        let signed = issuer.issue(&canonical).await?;
        tracing::debug!(video_id = %video.id, expires_at = %signed.expires_at, "Signed thumbnail URL");
        video.thumbnail_url = Some(signed.url);
    }
    Ok(video)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tubely_core::AppError;
    use tubely_processing::test_helpers::MockStorage;
    use tubely_storage::PresignConfig;
    use uuid::Uuid;

    fn issuer(storage: &MockStorage) -> AccessUrlIssuer {
        AccessUrlIssuer::new(Arc::new(storage.clone()), PresignConfig::default())
    }

    #[tokio::test]
    async fn test_signs_both_urls() {
        let storage = MockStorage::new();
        let mut video = Video::new(Uuid::new_v4(), "Boots".to_string(), String::new());
        video.video_url = Some(storage.canonical_url("landscape/abc.mp4"));
        video.thumbnail_url = Some(storage.canonical_url("thumbnails/abc.png"));

        let signed = sign_video(&issuer(&storage), video.clone()).await.unwrap();
        let video_url = signed.video_url.unwrap();
        assert!(video_url.starts_with(video.video_url.as_deref().unwrap()));
        assert!(video_url.contains("X-Amz-Expires=3600"));
        assert!(signed.thumbnail_url.unwrap().contains("X-Amz-Signature="));
    }

    #[tokio::test]
    async fn test_draft_passes_through() {
        let storage = MockStorage::new();
        let video = Video::new(Uuid::new_v4(), "Draft".to_string(), String::new());
        let signed = sign_video(&issuer(&storage), video.clone()).await.unwrap();
        assert_eq!(signed, video);
    }

    #[tokio::test]
    async fn test_comma_form_is_location_error() {
        let storage = MockStorage::new();
        let mut video = Video::new(Uuid::new_v4(), "Legacy".to_string(), String::new());
        video.video_url = Some(format!("{},landscape/abc.mp4", MockStorage::BUCKET));

        let HttpAppError(err) = sign_video(&issuer(&storage), video).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedLocation(_)));
    }
}
