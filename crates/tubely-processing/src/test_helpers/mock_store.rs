//! In-memory video metadata store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tubely_core::{AppError, Video};
use tubely_db::VideoStore;
use uuid::Uuid;

use super::CallLog;

#[derive(Clone, Default)]
pub struct MemoryVideoStore {
    videos: Arc<Mutex<HashMap<Uuid, Video>>>,
    updates: Arc<AtomicUsize>,
    fail_updates: Arc<AtomicBool>,
    log: CallLog,
}

impl MemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.log = log;
        self
    }

    pub fn insert(&self, video: Video) {
        self.videos.lock().unwrap().insert(video.id, video);
    }

    pub fn video(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    /// Make every following update fail as if the database went away.
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    fn update(&self, id: Uuid, apply: impl FnOnce(&mut Video)) -> Result<Video, AppError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Database("simulated connection loss".to_string()));
        }

        let mut videos = self.videos.lock().unwrap();
        let stored = videos
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;

        apply(stored);
        stored.updated_at = chrono::Utc::now();

        self.updates.fetch_add(1, Ordering::SeqCst);
        self.log.record(format!("update:{}", id));
        Ok(stored.clone())
    }
}

#[async_trait]
impl VideoStore for MemoryVideoStore {
    async fn create_video(&self, video: &Video) -> Result<Video, AppError> {
        self.insert(video.clone());
        Ok(video.clone())
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.video(id))
    }

    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError> {
        let mut videos: Vec<Video> = self
            .videos
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }

    async fn set_video_url(&self, id: Uuid, url: &str) -> Result<Video, AppError> {
        self.update(id, |video| video.video_url = Some(url.to_string()))
    }

    async fn set_thumbnail_url(&self, id: Uuid, url: &str) -> Result<Video, AppError> {
        self.update(id, |video| video.thumbnail_url = Some(url.to_string()))
    }
}
