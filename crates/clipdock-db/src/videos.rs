use async_trait::async_trait;
use uuid::Uuid;

use clipdock_core::{AppResult, Video};

/// Persistence seam for video records. Production uses
/// [`crate::PgVideoStore`]; tests use [`crate::MemoryVideoStore`].
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Inserts a draft record with no media attached yet.
    async fn create(&self, user_id: Uuid, title: &str) -> AppResult<Video>;

    /// Fetches a record, failing with `NotFound` for unknown ids.
    async fn get(&self, video_id: Uuid) -> AppResult<Video>;

    async fn set_video_url(&self, video_id: Uuid, url: &str) -> AppResult<Video>;

    async fn set_thumbnail_url(&self, video_id: Uuid, url: &str) -> AppResult<Video>;
}
