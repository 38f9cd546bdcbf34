//! Video ingestion pipeline.
//!
//! One upload runs strictly in order: the content type is checked before anything
//! touches disk, the body is staged, probed and remuxed, the result is stored under a
//! category-prefixed random key, and only then is the canonical URL written to the
//! video record. Scratch files are owned by drop guards and removed on every path.

use bytes::Bytes;
use futures::Stream;
use std::error::Error as StdError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tubely_core::{Config, Video};
use tubely_db::VideoStore;
use tubely_storage::keys::{extension_for, generate_key, normalize_content_type};
use tubely_storage::{Storage, StorageError};

use super::error::IngestError;
use crate::staging::stage;
use crate::video::{classify_aspect_ratio, MediaAnalyzer, Remuxer};

/// Settings the pipeline reads from the application config.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub scratch_dir: PathBuf,
    pub max_video_bytes: usize,
    pub allowed_content_types: Vec<String>,
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
    pub command_timeout: Duration,
}

impl IngestConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            scratch_dir: config.scratch_dir.clone(),
            max_video_bytes: config.max_video_size_bytes,
            allowed_content_types: config.video_allowed_content_types.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
            ffmpeg_path: config.ffmpeg_path.clone(),
            command_timeout: config.media_command_timeout(),
        }
    }
}

pub struct VideoIngestPipeline {
    storage: Arc<dyn Storage>,
    store: Arc<dyn VideoStore>,
    analyzer: MediaAnalyzer,
    remuxer: Remuxer,
    config: IngestConfig,
}

impl VideoIngestPipeline {
    pub fn new(storage: Arc<dyn Storage>, store: Arc<dyn VideoStore>, config: IngestConfig) -> Self {
        Self {
            analyzer: MediaAnalyzer::new(config.ffprobe_path.clone(), config.command_timeout),
            remuxer: Remuxer::new(config.ffmpeg_path.clone(), config.command_timeout),
            storage,
            store,
            config,
        }
    }

    pub fn max_video_bytes(&self) -> usize {
        self.config.max_video_bytes
    }

    /// Ingest one upload for `video` and return the record with its new `video_url`.
    ///
    /// On any error before the put, neither the object store nor the record is touched.
    #[tracing::instrument(skip(self, video, stream), fields(video_id = %video.id))]
    pub async fn ingest<S, E>(
        &self,
        video: &Video,
        content_type: &str,
        stream: S,
    ) -> Result<Video, IngestError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let start = std::time::Instant::now();

        let extension = extension_for(content_type, &self.config.allowed_content_types)
            .map_err(|e| match e {
                StorageError::UnsupportedContentType(msg) => IngestError::UnsupportedContentType(msg),
                other => IngestError::Storage(other),
            })?;
        let content_type = normalize_content_type(content_type);

        let staged = stage(&self.config.scratch_dir, stream, self.config.max_video_bytes).await?;

        let probe = self.analyzer.probe(staged.path()).await?;
        let remuxed = self.remuxer.remux_faststart(staged.path()).await?;

        let category = classify_aspect_ratio(&probe.aspect_ratio);
        let key = generate_key(category.as_str(), &extension);

        let location = self
            .storage
            .put_file(&key, remuxed.path(), &content_type)
            .await
            .map_err(IngestError::Storage)?;

        drop(remuxed);
        drop(staged);

        let updated = self.store.set_video_url(video.id, &location).await.map_err(|source| {
            tracing::error!(
                error = %source,
                location = %location,
                "Video stored but record update failed"
            );
            IngestError::RecordNotUpdated {
                location: location.clone(),
                source,
            }
        })?;

        tracing::info!(
            key = %key,
            category = %category,
            aspect_ratio = %probe.aspect_ratio,
            duration_ms = start.elapsed().as_millis(),
            "Video ingested"
        );

        Ok(updated)
    }
}
