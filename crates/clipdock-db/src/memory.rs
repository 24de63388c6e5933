use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use clipdock_core::{AppError, AppResult, Video};

use crate::videos::VideoStore;

/// In-memory [`VideoStore`] for tests, with a toggle that makes URL updates
/// fail so the post-placement failure path can be exercised.
pub struct MemoryVideoStore {
    videos: Mutex<HashMap<Uuid, Video>>,
    fail_updates: AtomicBool,
}

impl MemoryVideoStore {
    pub fn new() -> Self {
        Self {
            videos: Mutex::new(HashMap::new()),
            fail_updates: AtomicBool::new(false),
        }
    }

    /// Every subsequent `set_video_url` / `set_thumbnail_url` fails.
    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    /// Inserts a draft record directly, bypassing `create`.
    pub fn seed(&self, user_id: Uuid, title: &str) -> Video {
        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            video_url: None,
            thumbnail_url: None,
            created_at: now,
            updated_at: now,
        };
        self.videos.lock().unwrap().insert(video.id, video.clone());
        video
    }

    /// Snapshot of a record for assertions, without going through the trait.
    pub fn get_sync(&self, video_id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&video_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.videos.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.lock().unwrap().is_empty()
    }

    fn update<F>(&self, video_id: Uuid, apply: F) -> AppResult<Video>
    where
        F: FnOnce(&mut Video),
    {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Internal(
                "forced record update failure".to_string(),
            ));
        }
        let mut videos = self.videos.lock().unwrap();
        let video = videos
            .get_mut(&video_id)
            .ok_or_else(|| AppError::NotFound(format!("video {video_id}")))?;
        apply(video);
        video.updated_at = Utc::now();
        Ok(video.clone())
    }
}

impl Default for MemoryVideoStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoStore for MemoryVideoStore {
    async fn create(&self, user_id: Uuid, title: &str) -> AppResult<Video> {
        Ok(self.seed(user_id, title))
    }

    async fn get(&self, video_id: Uuid) -> AppResult<Video> {
        self.get_sync(video_id)
            .ok_or_else(|| AppError::NotFound(format!("video {video_id}")))
    }

    async fn set_video_url(&self, video_id: Uuid, url: &str) -> AppResult<Video> {
        self.update(video_id, |video| video.video_url = Some(url.to_string()))
    }

    async fn set_thumbnail_url(&self, video_id: Uuid, url: &str) -> AppResult<Video> {
        self.update(video_id, |video| video.thumbnail_url = Some(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_record_is_fetchable() {
        let store = MemoryVideoStore::new();
        let user_id = Uuid::new_v4();
        let video = store.seed(user_id, "first clip");

        let fetched = store.get(video.id).await.unwrap();
        assert_eq!(fetched.title, "first clip");
        assert_eq!(fetched.user_id, user_id);
        assert!(fetched.video_url.is_none());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = MemoryVideoStore::new();
        assert!(matches!(
            store.get(Uuid::new_v4()).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn url_updates_touch_updated_at() {
        let store = MemoryVideoStore::new();
        let video = store.seed(Uuid::new_v4(), "clip");

        let updated = store
            .set_video_url(video.id, "https://cdn.example/landscape/k")
            .await
            .unwrap();

        assert_eq!(
            updated.video_url.as_deref(),
            Some("https://cdn.example/landscape/k")
        );
        assert!(updated.updated_at >= video.updated_at);
    }

    #[tokio::test]
    async fn forced_update_failure() {
        let store = MemoryVideoStore::new();
        let video = store.seed(Uuid::new_v4(), "clip");
        store.fail_updates();

        assert!(store.set_video_url(video.id, "https://x").await.is_err());
        assert!(store.get_sync(video.id).unwrap().video_url.is_none());
    }
}
