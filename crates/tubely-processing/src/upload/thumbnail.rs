//! Thumbnail publishing.
//!
//! Thumbnails are small, so they are taken as bytes and copied to the object store
//! as-is under `thumbnails/<random>.<ext>`; no probing or remuxing is involved.

use bytes::Bytes;
use std::sync::Arc;

use tubely_core::constants::THUMBNAIL_PREFIX;
use tubely_core::{Config, Video};
use tubely_db::VideoStore;
use tubely_storage::keys::{extension_for, generate_key, normalize_content_type};
use tubely_storage::{Storage, StorageError};

use super::error::IngestError;

pub struct ThumbnailPublisher {
    storage: Arc<dyn Storage>,
    store: Arc<dyn VideoStore>,
    max_bytes: usize,
    allowed_content_types: Vec<String>,
}

impl ThumbnailPublisher {
    pub fn new(
        storage: Arc<dyn Storage>,
        store: Arc<dyn VideoStore>,
        max_bytes: usize,
        allowed_content_types: Vec<String>,
    ) -> Self {
        Self {
            storage,
            store,
            max_bytes,
            allowed_content_types,
        }
    }

    pub fn from_config(config: &Config, storage: Arc<dyn Storage>, store: Arc<dyn VideoStore>) -> Self {
        Self::new(
            storage,
            store,
            config.max_thumbnail_size_bytes,
            config.thumbnail_allowed_content_types.clone(),
        )
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    #[tracing::instrument(skip(self, video, data), fields(video_id = %video.id, size_bytes = data.len()))]
    pub async fn publish(
        &self,
        video: &Video,
        content_type: &str,
        data: Bytes,
    ) -> Result<Video, IngestError> {
        let extension = extension_for(content_type, &self.allowed_content_types).map_err(|e| {
            match e {
                StorageError::UnsupportedContentType(msg) => {
                    IngestError::UnsupportedContentType(msg)
                }
                other => IngestError::Storage(other),
            }
        })?;

        if data.len() > self.max_bytes {
            return Err(IngestError::TooLarge {
                limit: self.max_bytes,
            });
        }

        let key = generate_key(THUMBNAIL_PREFIX, &extension);
        let location = self
            .storage
            .put_bytes(&key, data, &normalize_content_type(content_type))
            .await
            .map_err(IngestError::Storage)?;

        let updated = self
            .store
            .set_thumbnail_url(video.id, &location)
            .await
            .map_err(|source| IngestError::RecordNotUpdated {
                location: location.clone(),
                source,
            })?;

        tracing::info!(key = %key, "Thumbnail published");

        Ok(updated)
    }
}
