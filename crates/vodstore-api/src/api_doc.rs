//! OpenAPI document assembly.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers::integrity::CleanupResponse;
use crate::handlers::video_upload::UploadVideoResponse;
use vodstore_core::models::{
    CleanupRecord, CleanupResult, IntegrityEntry, IntegrityReport, IntegritySummary, RecordStatus,
    VideoResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::video_upload::upload_video,
        crate::handlers::video_get::list_videos,
        crate::handlers::video_get::get_video,
        crate::handlers::integrity::check_integrity,
        crate::handlers::integrity::cleanup_orphaned,
        crate::handlers::public_file::serve_artifact,
    ),
    components(schemas(
        VideoResponse,
        UploadVideoResponse,
        ErrorResponse,
        IntegrityReport,
        IntegritySummary,
        IntegrityEntry,
        RecordStatus,
        CleanupResponse,
        CleanupResult,
        CleanupRecord,
    )),
    tags(
        (name = "videos", description = "Video upload, listing, and delivery"),
        (name = "integrity", description = "Record/artifact reconciliation")
    )
)]
pub struct ApiDoc;
