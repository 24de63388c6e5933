use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use clipdock_core::{AppError, VideoResponse};

use crate::auth::CurrentUser;
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
}

/// Creates a draft record the media uploads attach to later.
pub async fn create_video(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateVideoRequest>,
) -> Result<(StatusCode, Json<VideoResponse>), HttpAppError> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("title must not be empty".to_string()).into());
    }

    let video = state.videos.create(user.0, title).await?;
    Ok((StatusCode::CREATED, Json(VideoResponse::from(video))))
}
