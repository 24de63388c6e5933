use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use clipdock_core::{AppError, AppResult, Video};

use crate::videos::VideoStore;

#[derive(Clone)]
pub struct PgVideoStore {
    pool: PgPool,
}

impl PgVideoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoStore for PgVideoStore {
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "insert"))]
    async fn create(&self, user_id: Uuid, title: &str) -> AppResult<Video> {
        let video = sqlx::query_as::<Postgres, Video>(
            r#"
            INSERT INTO videos (user_id, title)
            VALUES ($1, $2)
            RETURNING id, user_id, title, video_url, thumbnail_url, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .fetch_one(&self.pool)
        .await?;
        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn get(&self, video_id: Uuid) -> AppResult<Video> {
        sqlx::query_as::<Postgres, Video>(
            r#"
            SELECT id, user_id, title, video_url, thumbnail_url, created_at, updated_at
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("video {video_id}")))
    }

    #[tracing::instrument(skip(self, url), fields(db.table = "videos", db.operation = "update"))]
    async fn set_video_url(&self, video_id: Uuid, url: &str) -> AppResult<Video> {
        sqlx::query_as::<Postgres, Video>(
            r#"
            UPDATE videos
            SET video_url = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, title, video_url, thumbnail_url, created_at, updated_at
            "#,
        )
        .bind(video_id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("video {video_id}")))
    }

    #[tracing::instrument(skip(self, url), fields(db.table = "videos", db.operation = "update"))]
    async fn set_thumbnail_url(&self, video_id: Uuid, url: &str) -> AppResult<Video> {
        sqlx::query_as::<Postgres, Video>(
            r#"
            UPDATE videos
            SET thumbnail_url = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, title, video_url, thumbnail_url, created_at, updated_at
            "#,
        )
        .bind(video_id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("video {video_id}")))
    }
}
