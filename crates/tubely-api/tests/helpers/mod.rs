//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p tubely-api`. Storage and the video store
//! are in-memory fakes; ffprobe and ffmpeg are shell scripts in a temp dir.

#![allow(dead_code)]

use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tubely_api::setup::routes;
use tubely_api::state::AppState;
use tubely_api::auth::JwtService;
use tubely_core::{Config, Video};
use tubely_processing::test_helpers::{CallLog, FakeTools, MemoryVideoStore, MockStorage};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const MAX_VIDEO_BYTES: usize = 64 * 1024;
pub const MAX_THUMBNAIL_BYTES: usize = 1024;

pub fn test_config(scratch: &TempDir, tools: &FakeTools) -> Config {
    Config {
        server_port: 0,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        log_format: "pretty".to_string(),
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 1,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        s3_bucket: MockStorage::BUCKET.to_string(),
        s3_region: MockStorage::REGION.to_string(),
        s3_endpoint: None,
        aws_access_key_id: None,
        aws_secret_access_key: None,
        s3_max_retries: 0,
        ffmpeg_path: tools.ffmpeg_path(),
        ffprobe_path: tools.ffprobe_path(),
        media_command_timeout_secs: 10,
        scratch_dir: scratch.path().to_path_buf(),
        max_video_size_bytes: MAX_VIDEO_BYTES,
        max_thumbnail_size_bytes: MAX_THUMBNAIL_BYTES,
        video_allowed_content_types: vec!["video/mp4".to_string()],
        thumbnail_allowed_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
        presigned_url_expiry_secs: 3600,
    }
}

/// A user with a valid bearer token.
pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

/// Test application: server plus handles on every fake it talks to.
pub struct TestApp {
    pub server: TestServer,
    pub storage: MockStorage,
    pub store: MemoryVideoStore,
    pub tools: FakeTools,
    pub log: CallLog,
    pub scratch: TempDir,
    jwt: JwtService,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn user(&self) -> TestUser {
        let id = Uuid::new_v4();
        let token = self
            .jwt
            .issue(id, Duration::from_secs(3600))
            .expect("issue token");
        TestUser { id, token }
    }

    /// Insert a draft video owned by `user` straight into the store.
    pub fn draft_video(&self, user: &TestUser) -> Video {
        let video = Video::new(user.id, "Boots".to_string(), String::new());
        self.store.insert(video.clone());
        video
    }

    pub fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(self.scratch.path())
            .expect("read scratch dir")
            .next()
            .is_none()
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with_tools(FakeTools::new("16:9"))
}

pub fn setup_test_app_with_tools(tools: FakeTools) -> TestApp {
    let scratch = tempfile::tempdir().expect("scratch dir");
    let config = test_config(&scratch, &tools);

    let log = CallLog::new();
    let storage = MockStorage::new().with_call_log(log.clone());
    let store = MemoryVideoStore::new().with_call_log(log.clone());

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(store.clone()),
        Arc::new(storage.clone()),
    ));
    let router = routes::setup_routes(&config, state).expect("router");
    let server = TestServer::new(router).expect("test server");

    TestApp {
        server,
        storage,
        store,
        tools,
        log,
        scratch,
        jwt: JwtService::new(TEST_JWT_SECRET),
    }
}

pub fn bearer(user: &TestUser) -> String {
    format!("Bearer {}", user.token)
}
