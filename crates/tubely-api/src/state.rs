//! Application state shared by every handler.

use std::sync::Arc;

use tubely_core::Config;
use tubely_db::VideoStore;
use tubely_processing::{IngestConfig, ThumbnailPublisher, VideoIngestPipeline};
use tubely_storage::{AccessUrlIssuer, PresignConfig, Storage};

use crate::auth::JwtService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoStore>,
    pub access_urls: AccessUrlIssuer,
    pub ingest: Arc<VideoIngestPipeline>,
    pub thumbnails: Arc<ThumbnailPublisher>,
    pub jwt: Arc<JwtService>,
}

impl AppState {
    /// Wire services from config around an already-built store and storage backend.
    pub fn new(config: Config, videos: Arc<dyn VideoStore>, storage: Arc<dyn Storage>) -> Self {
        let access_urls = AccessUrlIssuer::new(
            storage.clone(),
            PresignConfig {
                expiry: config.presigned_url_expiry(),
            },
        );
        let ingest = VideoIngestPipeline::new(
            storage.clone(),
            videos.clone(),
            IngestConfig::from_config(&config),
        );
        let thumbnails = ThumbnailPublisher::from_config(&config, storage, videos.clone());
        let jwt = JwtService::new(&config.jwt_secret);

        Self {
            config,
            videos,
            access_urls,
            ingest: Arc::new(ingest),
            thumbnails: Arc::new(thumbnails),
            jwt: Arc::new(jwt),
        }
    }
}
