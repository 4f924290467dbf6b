//! Domain models.

mod integrity;
mod media;

pub use integrity::{
    CleanupRecord, CleanupResult, IntegrityEntry, IntegrityReport, IntegritySummary, RecordStatus,
};
pub use media::{
    extract_artifact_id, thumbnail_public_path, video_public_path, MediaRecord, NewMediaRecord,
    VideoResponse,
};
