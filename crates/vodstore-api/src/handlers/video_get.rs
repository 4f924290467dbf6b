use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use vodstore_core::models::VideoResponse;
use vodstore_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/videos",
    tag = "videos",
    responses(
        (status = 200, description = "All videos", body = Vec<VideoResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_videos"))]
pub async fn list_videos(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, HttpAppError> {
    let records = state
        .repository
        .list_all()
        .await
        .map_err(HttpAppError::from)?;

    let responses: Vec<VideoResponse> = records.into_iter().map(VideoResponse::from).collect();
    Ok(Json(responses))
}

#[utoipa::path(
    get,
    path = "/videos/{id}",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video found", body = VideoResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(video_id = %id, operation = "get_video"))]
pub async fn get_video(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = state
        .repository
        .get(id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    Ok(Json(VideoResponse::from(record)))
}
