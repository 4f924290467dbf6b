use std::path::{Path, PathBuf};

use axum::{extract::Multipart, extract::State, Json};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use utoipa::ToSchema;
use uuid::Uuid;

use vodstore_core::models::VideoResponse;
use vodstore_core::AppError;
use vodstore_processing::UploadedVideo;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadVideoResponse {
    pub message: String,
    pub video: VideoResponse,
}

/// A multipart upload spooled to disk plus its companion text fields.
struct ReceivedUpload {
    source_path: PathBuf,
    original_filename: String,
    description: Option<String>,
    uploader_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "videos",
    responses(
        (status = 200, description = "Video uploaded and ingested", body = UploadVideoResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Ingestion failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_video"))]
pub async fn upload_video(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadVideoResponse>, HttpAppError> {
    let received = receive_upload(&state, multipart).await?;

    let record = state
        .pipeline
        .ingest(UploadedVideo {
            source_path: received.source_path,
            original_filename: received.original_filename,
            description: received.description,
            uploader_id: received.uploader_id,
        })
        .await
        .map_err(HttpAppError::from)?;

    Ok(Json(UploadVideoResponse {
        message: "Video uploaded successfully".to_string(),
        video: VideoResponse::from(record),
    }))
}

/// Stream the multipart body to disk, validating the file field and
/// enforcing the configured size limit while counting bytes.
async fn receive_upload(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<ReceivedUpload, HttpAppError> {
    let incoming_dir = state.config.incoming_dir();
    tokio::fs::create_dir_all(&incoming_dir)
        .await
        .map_err(|e| AppError::Storage(format!("failed to create incoming directory: {}", e)))?;

    let mut source: Option<(PathBuf, String)> = None;
    let mut description: Option<String> = None;
    let mut uploader_id: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let original_filename = field
                    .file_name()
                    .map(|name| name.to_string())
                    .ok_or_else(|| AppError::InvalidInput("File field has no filename".into()))?;
                let content_type = field
                    .content_type()
                    .map(|ct| ct.to_string())
                    .unwrap_or_default();

                state
                    .validator
                    .validate_upload(&original_filename, &content_type)
                    .map_err(HttpAppError::from)?;

                let source_path =
                    incoming_dir.join(spool_file_name(&original_filename));
                let written =
                    spool_field(state, &mut field, &source_path).await;

                match written {
                    Ok(size) => {
                        state
                            .validator
                            .validate_file_size(size)
                            .map_err(HttpAppError::from)
                            .inspect_err(|_| {
                                forget_partial_upload(&source_path);
                            })?;
                        source = Some((source_path, original_filename));
                    }
                    Err(e) => {
                        forget_partial_upload(&source_path);
                        return Err(e);
                    }
                }
            }
            Some("description") => {
                description = field.text().await.ok();
            }
            Some("uploaderId") => {
                uploader_id = field.text().await.ok();
            }
            _ => {}
        }
    }

    let (source_path, original_filename) =
        source.ok_or_else(|| AppError::InvalidInput("Missing file field".to_string()))?;

    Ok(ReceivedUpload {
        source_path,
        original_filename,
        description,
        uploader_id,
    })
}

/// Spooled name: `file-{uuid}.{ext}`, discarding any client-supplied path.
fn spool_file_name(original_filename: &str) -> String {
    let extension = Path::new(original_filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "bin".to_string());
    format!("file-{}.{}", Uuid::new_v4(), extension)
}

async fn spool_field(
    state: &AppState,
    field: &mut axum::extract::multipart::Field<'_>,
    dest: &Path,
) -> Result<usize, HttpAppError> {
    let max = state.validator.max_file_size();

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| AppError::Storage(format!("failed to create upload file: {}", e)))?;

    let mut written = 0usize;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Upload stream error: {}", e)))?
    {
        written += chunk.len();
        if written > max {
            return Err(HttpAppError(AppError::PayloadTooLarge(format!(
                "{} bytes exceeds max {} bytes",
                written, max
            ))));
        }
        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::Storage(format!("failed to write upload file: {}", e)))?;
    }
    file.flush()
        .await
        .map_err(|e| AppError::Storage(format!("failed to flush upload file: {}", e)))?;

    Ok(written)
}

/// Remove a rejected spool file; the upload never entered the pipeline, so
/// nothing references it.
fn forget_partial_upload(path: &Path) {
    let path = path.to_path_buf();
    tokio::spawn(async move {
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::debug!(path = %path.display(), error = %e, "Failed to remove rejected upload");
        }
    });
}
