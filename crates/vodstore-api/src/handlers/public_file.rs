use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use vodstore_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Adaptive-bitrate players reject mislabeled content, so playlist and
/// segment types are pinned explicitly rather than guessed.
fn content_type_for(file_name: &str) -> &'static str {
    match file_name.rsplit('.').next() {
        Some("m3u8") => "application/vnd.apple.mpegurl",
        Some("ts") => "video/mp2t",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

#[utoipa::path(
    get,
    path = "/uploads/videos/{id}/{file_name}",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Artifact directory ID"),
        ("file_name" = String, Path, description = "Playlist, segment, or thumbnail file name")
    ),
    responses(
        (status = 200, description = "Artifact file"),
        (status = 400, description = "Invalid file name", body = ErrorResponse),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(artifact_id = %id, file_name = %file_name))]
pub async fn serve_artifact(
    State(state): State<AppState>,
    Path((id, file_name)): Path<(Uuid, String)>,
) -> Result<Response, HttpAppError> {
    let path = state
        .artifacts
        .resolve_file(id, &file_name)
        .map_err(HttpAppError::from)?;

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(HttpAppError(AppError::NotFound(format!(
                "File {} not found",
                file_name
            ))));
        }
        Err(e) => {
            return Err(HttpAppError(AppError::Storage(format!(
                "failed to open {}: {}",
                path.display(),
                e
            ))));
        }
    };

    let stream = ReaderStream::new(file);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&file_name))
        .header(
            header::CACHE_CONTROL,
            "public, max-age=31536000, immutable",
        )
        .body(Body::from_stream(stream))
        .map_err(|e| {
            HttpAppError(AppError::Internal(format!(
                "failed to build artifact response: {}",
                e
            )))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types_for_hls_delivery() {
        assert_eq!(content_type_for("index.m3u8"), "application/vnd.apple.mpegurl");
        assert_eq!(content_type_for("segment000.ts"), "video/mp2t");
        assert_eq!(content_type_for("thumbnail.jpg"), "image/jpeg");
        assert_eq!(content_type_for("frame.png"), "image/png");
        assert_eq!(content_type_for("unknown"), "application/octet-stream");
    }
}
