pub mod database;
pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;

use clipdock_core::Config;
use clipdock_db::{PgVideoStore, VideoStore};
use clipdock_media::tool::{FfmpegTool, MediaTool};
use clipdock_storage::{AssetPlacer, RemoteStore, S3Remote};

use crate::services::upload::{UploadLimits, UploadPipeline};
use crate::state::AppState;

/// Wires the database, object storage, and media tooling into a router.
pub async fn initialize_app(config: Config) -> Result<Router> {
    let pool = database::setup_database(&config).await?;
    let videos: Arc<dyn VideoStore> = Arc::new(PgVideoStore::new(pool));

    let remote: Arc<dyn RemoteStore> = Arc::new(S3Remote::new(
        &config.s3_bucket,
        &config.s3_region,
        config.s3_endpoint.as_deref(),
    )?);
    let tool: Arc<dyn MediaTool> = Arc::new(FfmpegTool::new(
        config.ffprobe_path.clone(),
        config.ffmpeg_path.clone(),
        config.media_tool_timeout(),
    ));

    let uploader = UploadPipeline::new(
        tool,
        AssetPlacer::new(remote),
        videos.clone(),
        UploadLimits {
            max_video_bytes: config.max_video_size_bytes,
            max_thumbnail_bytes: config.max_thumbnail_size_bytes,
        },
        config.scratch_dir.clone(),
    );

    let state = AppState {
        config: Arc::new(config),
        videos,
        uploader,
    };

    Ok(routes::build_router(state))
}
