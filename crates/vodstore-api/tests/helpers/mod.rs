//! Test helpers: build AppState and router with a stub transcoder so no
//! ffmpeg binary is needed.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use tempfile::TempDir;

use vodstore_api::setup::routes::setup_routes;
use vodstore_api::state::AppState;
use vodstore_core::constants::PLAYLIST_FILE_NAME;
use vodstore_core::Config;
use vodstore_processing::{TranscodeError, Transcoder};
use vodstore_storage::ArtifactStore;

/// Stub transcoder: writes a playlist, one segment, and a real JPEG frame,
/// or fails the streaming stage when asked to.
pub struct StubTranscoder {
    pub fail_streaming: bool,
}

#[async_trait]
impl Transcoder for StubTranscoder {
    async fn produce_streaming_set(
        &self,
        _source: &Path,
        dest_dir: &Path,
    ) -> Result<(), TranscodeError> {
        if self.fail_streaming {
            return Err(TranscodeError::Failed {
                tool: "ffmpeg".to_string(),
                message: "exited with exit status: 1".to_string(),
                stderr: "Invalid data found when processing input".to_string(),
            });
        }
        tokio::fs::write(
            dest_dir.join(PLAYLIST_FILE_NAME),
            "#EXTM3U\n#EXT-X-VERSION:3\n#EXTINF:10.0,\nsegment000.ts\n#EXT-X-ENDLIST\n",
        )
        .await
        .unwrap();
        tokio::fs::write(dest_dir.join("segment000.ts"), vec![0u8; 512])
            .await
            .unwrap();
        Ok(())
    }

    async fn extract_frame(
        &self,
        _source: &Path,
        dest: &Path,
        _offset_seconds: f64,
    ) -> Result<(), TranscodeError> {
        let img = image::RgbImage::from_pixel(64, 36, image::Rgb([10, 120, 200]));
        img.save(dest).unwrap();
        Ok(())
    }

    async fn probe_duration(&self, _source: &Path) -> Result<Option<f64>, TranscodeError> {
        Ok(Some(30.0))
    }
}

/// Test application: server plus the state and temp dir backing it.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

fn test_config(media_root: PathBuf) -> Config {
    Config {
        server_port: 0,
        cors_origins: vec!["*".to_string()],
        environment: "test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        db_max_connections: 1,
        media_root,
        public_base_url: String::new(),
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        hls_segment_duration: 10,
        transcode_timeout_secs: 600,
        max_concurrent_transcodes: 2,
        frame_offset_secs: 2.0,
        thumbnail_width: 640,
        thumbnail_height: 360,
        thumbnail_quality: 80,
        max_video_size_bytes: 10 * 1024 * 1024,
        video_allowed_extensions: vec![
            "mp4".to_string(),
            "webm".to_string(),
            "ogg".to_string(),
        ],
        video_allowed_content_types: vec![
            "video/mp4".to_string(),
            "video/webm".to_string(),
            "video/ogg".to_string(),
        ],
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(StubTranscoder {
        fail_streaming: false,
    })
    .await
}

pub async fn setup_failing_test_app() -> TestApp {
    setup_test_app_with(StubTranscoder {
        fail_streaming: true,
    })
    .await
}

async fn setup_test_app_with(transcoder: StubTranscoder) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path().join("uploads"));

    let pool = vodstore_db::connect_in_memory().await.unwrap();
    let artifacts = ArtifactStore::new(config.videos_dir()).await.unwrap();

    let state = AppState::new(config, pool, artifacts, Arc::new(transcoder));
    let router = setup_routes(state.clone()).unwrap();
    let server = TestServer::new(router).unwrap();

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}

/// Multipart form for a fake video upload.
pub fn video_form(filename: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(vec![0u8; 4096])
            .file_name(filename)
            .mime_type("video/mp4"),
    )
}

/// Upload a video and return the response body.
pub async fn upload_video(app: &TestApp, filename: &str) -> serde_json::Value {
    let response = app.client().post("/upload").multipart(video_form(filename)).await;
    assert_eq!(response.status_code(), 200, "upload failed: {}", response.text());
    response.json()
}
