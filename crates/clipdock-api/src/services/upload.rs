use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use uuid::Uuid;

use clipdock_core::{AppError, AppResult, Video};
use clipdock_db::VideoStore;
use clipdock_media::aspect::AspectClass;
use clipdock_media::staging::StagedFile;
use clipdock_media::tool::MediaTool;
use clipdock_storage::{AssetPlacer, StoredAsset};

pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";
pub const THUMBNAIL_CONTENT_TYPES: [&str; 2] = ["image/jpeg", "image/png"];
const THUMBNAIL_PREFIX: &str = "thumbnails";

/// One multipart file field, decoupled from the HTTP layer.
pub struct IncomingUpload<S> {
    pub content_type: String,
    /// Content-Length of the request when the client sent one. An upper
    /// bound on the payload, checked before any byte is staged.
    pub declared_size: Option<u64>,
    pub stream: S,
}

#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_video_bytes: u64,
    pub max_thumbnail_bytes: u64,
}

/// Runs an upload end to end: validate, authorize, stage to scratch disk,
/// classify, rewrite for streaming, place into object storage, and persist
/// the resulting URL. The staged scratch directory is released on every
/// path, success or failure.
#[derive(Clone)]
pub struct UploadPipeline {
    tool: Arc<dyn MediaTool>,
    placer: AssetPlacer,
    videos: Arc<dyn VideoStore>,
    limits: UploadLimits,
    scratch_dir: PathBuf,
}

impl UploadPipeline {
    pub fn new(
        tool: Arc<dyn MediaTool>,
        placer: AssetPlacer,
        videos: Arc<dyn VideoStore>,
        limits: UploadLimits,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            tool,
            placer,
            videos,
            limits,
            scratch_dir,
        }
    }

    #[tracing::instrument(skip(self, upload), fields(video.id = %video_id, user.id = %user_id))]
    pub async fn upload_video<S>(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        upload: IncomingUpload<S>,
    ) -> AppResult<Video>
    where
        S: Stream<Item = Result<Bytes, io::Error>> + Send + Unpin,
    {
        let content_type = normalize_content_type(&upload.content_type);
        if content_type != VIDEO_CONTENT_TYPE {
            return Err(AppError::InvalidInput(format!(
                "unsupported content type '{}', expected {}",
                upload.content_type, VIDEO_CONTENT_TYPE
            )));
        }
        check_declared_size(upload.declared_size, self.limits.max_video_bytes)?;
        self.authorize(user_id, video_id).await?;

        let mut staged = StagedFile::acquire(&self.scratch_dir).await?;
        staged
            .write_stream(upload.stream, self.limits.max_video_bytes)
            .await?;
        staged.rewind().await?;

        let report = self.tool.probe(staged.path()).await?;
        let aspect = AspectClass::classify(report.width, report.height);
        tracing::info!(
            width = report.width,
            height = report.height,
            aspect = %aspect,
            size_bytes = staged.bytes_written(),
            "staged video classified"
        );

        let processed = self.tool.rewrite_for_streaming(staged.path()).await?;
        // ffmpeg can exit 0 and still leave an unusable file behind; only a
        // readable output goes to storage.
        self.tool
            .probe(&processed)
            .await
            .map_err(|err| AppError::Rewrite(format!("rewritten output failed probe: {err}")))?;

        let asset = self
            .placer
            .place(&processed, VIDEO_CONTENT_TYPE, aspect.prefix())
            .await?;

        match self.videos.set_video_url(video_id, &asset.url).await {
            Ok(updated) => {
                tracing::info!(storage.key = %asset.key, url = %asset.url, "video upload complete");
                Ok(updated)
            }
            Err(err) => Err(self.flag_orphan(asset, err).await),
        }
    }

    #[tracing::instrument(skip(self, upload), fields(video.id = %video_id, user.id = %user_id))]
    pub async fn upload_thumbnail<S>(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        upload: IncomingUpload<S>,
    ) -> AppResult<Video>
    where
        S: Stream<Item = Result<Bytes, io::Error>> + Send + Unpin,
    {
        let content_type = normalize_content_type(&upload.content_type);
        if !THUMBNAIL_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(AppError::InvalidInput(format!(
                "unsupported content type '{}', expected image/jpeg or image/png",
                upload.content_type
            )));
        }
        check_declared_size(upload.declared_size, self.limits.max_thumbnail_bytes)?;
        self.authorize(user_id, video_id).await?;

        let mut staged = StagedFile::acquire(&self.scratch_dir).await?;
        staged
            .write_stream(upload.stream, self.limits.max_thumbnail_bytes)
            .await?;
        staged.rewind().await?;

        let asset = self
            .placer
            .place(staged.path(), &content_type, THUMBNAIL_PREFIX)
            .await?;

        match self.videos.set_thumbnail_url(video_id, &asset.url).await {
            Ok(updated) => {
                tracing::info!(storage.key = %asset.key, url = %asset.url, "thumbnail upload complete");
                Ok(updated)
            }
            Err(err) => Err(self.flag_orphan(asset, err).await),
        }
    }

    /// The record must exist and belong to the caller before any byte is
    /// staged or any tool runs.
    async fn authorize(&self, user_id: Uuid, video_id: Uuid) -> AppResult<()> {
        let video = self.videos.get(video_id).await?;
        if video.user_id != user_id {
            return Err(AppError::Unauthorized(
                "video belongs to another user".to_string(),
            ));
        }
        Ok(())
    }

    /// Record update failed after the object was placed. Try the
    /// compensating delete, then surface the failure class distinctly.
    async fn flag_orphan(&self, asset: StoredAsset, err: AppError) -> AppError {
        match self.placer.remove(&asset.key).await {
            Ok(()) => {
                tracing::warn!(
                    storage.key = %asset.key,
                    "removed stored object after record update failure"
                );
            }
            Err(delete_err) => {
                tracing::error!(
                    storage.key = %asset.key,
                    error = %delete_err,
                    "object left behind after record update failure"
                );
            }
        }
        AppError::OrphanedAsset {
            key: asset.key,
            message: err.to_string(),
        }
    }
}

fn check_declared_size(declared: Option<u64>, max: u64) -> AppResult<()> {
    if let Some(size) = declared {
        if size > max {
            return Err(AppError::PayloadTooLarge { size, max });
        }
    }
    Ok(())
}

/// Strips any parameters and lowercases the media type, mirroring how
/// `mime.ParseMediaType`-style parsing treats `video/mp4; codecs=...`.
fn normalize_content_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}
