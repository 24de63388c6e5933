use std::io;

use axum::extract::{Multipart, Path, State};
use axum::http::HeaderMap;
use axum::Json;
use futures::TryStreamExt;
use uuid::Uuid;

use clipdock_core::{AppError, VideoResponse};

use crate::auth::CurrentUser;
use crate::error::HttpAppError;
use crate::services::upload::IncomingUpload;
use crate::state::AppState;

use super::declared_content_length;

const THUMBNAIL_FIELD: &str = "thumbnail";

/// Accepts the `thumbnail` multipart field for an existing video record.
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(video_id): Path<Uuid>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let declared_size = declared_content_length(&headers);

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(THUMBNAIL_FIELD) {
            continue;
        }
        let content_type = field
            .content_type()
            .ok_or_else(|| {
                AppError::InvalidInput("thumbnail field is missing a content type".to_string())
            })?
            .to_string();
        let stream = field.map_err(|err| io::Error::new(io::ErrorKind::Other, err));
        let upload = IncomingUpload {
            content_type,
            declared_size,
            stream,
        };
        let video = state
            .uploader
            .upload_thumbnail(user.0, video_id, upload)
            .await?;
        return Ok(Json(VideoResponse::from(video)));
    }

    Err(AppError::InvalidInput(format!("multipart field '{THUMBNAIL_FIELD}' is required")).into())
}
