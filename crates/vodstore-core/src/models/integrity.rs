use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Classification of one record against the artifact store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RecordStatus {
    #[serde(rename = "GOOD")]
    Good,
    #[serde(rename = "MISSING_FILES")]
    MissingFiles,
}

/// Per-record integrity findings. Computed on demand, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityEntry {
    pub video_id: Uuid,
    pub title: String,
    pub video_path: String,
    pub thumbnail_path: String,
    /// Directory identifier extracted from the stored video path; `None`
    /// when the path is malformed. A value differing from the record's
    /// artifact id means the path string was edited out-of-band.
    pub extracted_video_id: Option<Uuid>,
    pub dir_exists: bool,
    pub video_exists: bool,
    pub thumbnail_exists: bool,
    /// Actual directory contents, for diagnostics.
    pub dir_contents: Vec<String>,
    pub status: RecordStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IntegritySummary {
    pub total: usize,
    pub good: usize,
    pub broken: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IntegrityReport {
    pub summary: IntegritySummary,
    pub details: Vec<IntegrityEntry>,
}

/// Identity of a record targeted by cleanup.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupRecord {
    pub video_id: Uuid,
    pub title: String,
    pub video_path: String,
}

/// Outcome of a cleanup run. In a dry run `records` lists the candidates
/// that would be deleted; in a confirmed run it lists what was actually
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResult {
    pub dry_run: bool,
    pub records: Vec<CleanupRecord>,
    /// Count of per-record delete failures (confirmed runs only); failures
    /// never abort the rest of the batch.
    pub failed_deletes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&RecordStatus::Good).unwrap(),
            "\"GOOD\""
        );
        assert_eq!(
            serde_json::to_string(&RecordStatus::MissingFiles).unwrap(),
            "\"MISSING_FILES\""
        );
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = IntegrityEntry {
            video_id: Uuid::new_v4(),
            title: "t".into(),
            video_path: "/uploads/videos/x/index.m3u8".into(),
            thumbnail_path: "/uploads/videos/x/thumbnail.jpg".into(),
            extracted_video_id: None,
            dir_exists: false,
            video_exists: false,
            thumbnail_exists: false,
            dir_contents: vec![],
            status: RecordStatus::MissingFiles,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("videoId").is_some());
        assert!(json.get("extractedVideoId").is_some());
        assert!(json.get("dirContents").is_some());
        assert_eq!(json.get("status").unwrap(), "MISSING_FILES");
    }
}
