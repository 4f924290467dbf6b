use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::{PLAYLIST_FILE_NAME, PUBLIC_VIDEO_PREFIX, THUMBNAIL_FILE_NAME};

/// One durable record per ingested video.
///
/// `artifact_id` names the storage directory holding the HLS set and
/// thumbnail. The public path strings embed the same identifier as a path
/// segment; there is no foreign key between the record store and the
/// filesystem, which is exactly the drift the integrity reconciler exists
/// to detect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: Uuid,
    pub artifact_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_path: String,
    pub thumbnail_path: String,
    pub uploader_id: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a record; identity and timestamp are assigned by the
/// repository at persistence time.
#[derive(Debug, Clone)]
pub struct NewMediaRecord {
    pub artifact_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_path: String,
    pub thumbnail_path: String,
    pub uploader_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_path: String,
    pub thumbnail_path: String,
    pub uploader_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<MediaRecord> for VideoResponse {
    fn from(record: MediaRecord) -> Self {
        VideoResponse {
            id: record.id,
            title: record.title,
            description: record.description,
            video_path: record.video_path,
            thumbnail_path: record.thumbnail_path,
            uploader_id: record.uploader_id,
            created_at: record.created_at,
        }
    }
}

/// Public path of the entry-point playlist for an artifact directory.
pub fn video_public_path(base_url: &str, artifact_id: Uuid) -> String {
    format!(
        "{}{}/{}/{}",
        base_url.trim_end_matches('/'),
        PUBLIC_VIDEO_PREFIX,
        artifact_id,
        PLAYLIST_FILE_NAME
    )
}

/// Public path of the thumbnail for an artifact directory.
pub fn thumbnail_public_path(base_url: &str, artifact_id: Uuid) -> String {
    format!(
        "{}{}/{}/{}",
        base_url.trim_end_matches('/'),
        PUBLIC_VIDEO_PREFIX,
        artifact_id,
        THUMBNAIL_FILE_NAME
    )
}

/// Extract the artifact directory identifier embedded in a stored public
/// path: the path segment directly above the file name. Returns `None` for
/// paths that do not follow the `<prefix>/<uuid>/<file>` layout; callers
/// surface that as an anomaly rather than failing.
pub fn extract_artifact_id(path: &str) -> Option<Uuid> {
    path.rsplit('/')
        .nth(1)
        .and_then(|segment| Uuid::parse_str(segment).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths_embed_artifact_id() {
        let id = Uuid::new_v4();
        let video = video_public_path("", id);
        let thumb = thumbnail_public_path("", id);
        assert_eq!(video, format!("/uploads/videos/{}/index.m3u8", id));
        assert_eq!(thumb, format!("/uploads/videos/{}/thumbnail.jpg", id));
    }

    #[test]
    fn test_public_paths_respect_base_url() {
        let id = Uuid::new_v4();
        let video = video_public_path("http://localhost:8000/", id);
        assert_eq!(
            video,
            format!("http://localhost:8000/uploads/videos/{}/index.m3u8", id)
        );
    }

    #[test]
    fn test_extract_artifact_id_round_trips() {
        let id = Uuid::new_v4();
        assert_eq!(extract_artifact_id(&video_public_path("", id)), Some(id));
        assert_eq!(
            extract_artifact_id(&thumbnail_public_path("http://h:1", id)),
            Some(id)
        );
    }

    #[test]
    fn test_extract_artifact_id_malformed_paths() {
        assert_eq!(extract_artifact_id(""), None);
        assert_eq!(extract_artifact_id("index.m3u8"), None);
        assert_eq!(extract_artifact_id("/uploads/videos/not-a-uuid/index.m3u8"), None);
        assert_eq!(extract_artifact_id("/uploads/videos//index.m3u8"), None);
    }

    #[test]
    fn test_video_response_from_record() {
        let record = MediaRecord {
            id: Uuid::new_v4(),
            artifact_id: Uuid::new_v4(),
            title: "clip.mp4".to_string(),
            description: "No description".to_string(),
            video_path: "/uploads/videos/x/index.m3u8".to_string(),
            thumbnail_path: "/uploads/videos/x/thumbnail.jpg".to_string(),
            uploader_id: "anonymous".to_string(),
            created_at: Utc::now(),
        };

        let response = VideoResponse::from(record.clone());
        assert_eq!(response.id, record.id);
        assert_eq!(response.title, "clip.mp4");

        let json = serde_json::to_value(&response).expect("serialize");
        assert!(json.get("videoPath").is_some());
        assert!(json.get("thumbnailPath").is_some());
        assert!(json.get("uploaderId").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
