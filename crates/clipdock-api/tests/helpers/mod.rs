#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use tempfile::TempDir;
use uuid::Uuid;

use clipdock_api::auth::jwt::issue_token;
use clipdock_api::services::upload::{UploadLimits, UploadPipeline};
use clipdock_api::setup::routes::build_router;
use clipdock_api::state::AppState;
use clipdock_core::{Config, Video};
use clipdock_db::MemoryVideoStore;
use clipdock_media::tool::FakeTool;
use clipdock_storage::{AssetPlacer, MemoryRemote};

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789ab";
pub const TEST_BUCKET: &str = "clipdock-test";
pub const TEST_REGION: &str = "us-east-1";

pub const DEFAULT_MAX_VIDEO_BYTES: u64 = 64 * 1024;
pub const DEFAULT_MAX_THUMBNAIL_BYTES: u64 = 16 * 1024;

/// Full application over in-memory fakes, plus handles to those fakes so
/// tests can assert on side effects.
pub struct TestApp {
    pub server: TestServer,
    pub videos: Arc<MemoryVideoStore>,
    pub remote: Arc<MemoryRemote>,
    pub tool: Arc<FakeTool>,
    pub scratch: TempDir,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::spawn_with_limits(DEFAULT_MAX_VIDEO_BYTES, DEFAULT_MAX_THUMBNAIL_BYTES)
    }

    pub fn spawn_with_limits(max_video_bytes: u64, max_thumbnail_bytes: u64) -> Self {
        let scratch = TempDir::new().expect("scratch dir");

        let config = Config {
            environment: "test".to_string(),
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            database_url: "postgresql://unused/clipdock".to_string(),
            db_max_connections: 1,
            db_timeout_seconds: 5,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            jwt_expiry_hours: 1,
            s3_bucket: TEST_BUCKET.to_string(),
            s3_region: TEST_REGION.to_string(),
            s3_endpoint: None,
            max_video_size_bytes: max_video_bytes,
            max_thumbnail_size_bytes: max_thumbnail_bytes,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            media_tool_timeout_secs: 10,
            scratch_dir: scratch.path().to_path_buf(),
        };

        let videos = Arc::new(MemoryVideoStore::new());
        let remote = Arc::new(MemoryRemote::new(TEST_BUCKET, TEST_REGION));
        let tool = Arc::new(FakeTool::new());

        let uploader = UploadPipeline::new(
            tool.clone(),
            AssetPlacer::new(remote.clone()),
            videos.clone(),
            UploadLimits {
                max_video_bytes,
                max_thumbnail_bytes,
            },
            scratch.path().to_path_buf(),
        );

        let state = AppState {
            config: Arc::new(config),
            videos: videos.clone(),
            uploader,
        };

        let server = TestServer::new(build_router(state)).expect("test server");

        Self {
            server,
            videos,
            remote,
            tool,
            scratch,
        }
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        issue_token(user_id, TEST_JWT_SECRET, 1).expect("token")
    }

    pub fn seed_video(&self, user_id: Uuid, title: &str) -> Video {
        self.videos.seed(user_id, title)
    }

    pub fn bearer(&self, user_id: Uuid) -> String {
        format!("Bearer {}", self.token_for(user_id))
    }

    pub fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(self.scratch.path())
            .expect("scratch dir readable")
            .count()
            == 0
    }

    pub fn stored_url(&self, key: &str) -> String {
        format!("https://{TEST_BUCKET}.s3.{TEST_REGION}.amazonaws.com/{key}")
    }
}
