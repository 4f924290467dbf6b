//! Test helpers: in-memory record store, tempdir-backed artifact store,
//! and a stub transcoder that writes real playlist/segment/frame files.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;
use uuid::Uuid;

use vodstore_core::constants::PLAYLIST_FILE_NAME;
use vodstore_db::{connect_in_memory, MediaRepository};
use vodstore_processing::{
    IngestOptions, IngestionPipeline, ThumbnailProcessor, TranscodeError, Transcoder,
    UploadedVideo,
};
use vodstore_storage::ArtifactStore;

/// Where the stub transcoder should fail, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Nowhere,
    StreamingSet,
    FrameExtraction,
    /// Succeed but write a frame the thumbnail processor cannot decode.
    BadFrame,
}

/// Transcoder double: produces a playlist, one segment, and a real JPEG
/// frame without invoking any external binary.
pub struct StubTranscoder {
    pub fail: FailAt,
    pub duration: Option<f64>,
    pub last_frame_offset: Mutex<Option<f64>>,
}

impl StubTranscoder {
    pub fn ok() -> Self {
        Self::with_failure(FailAt::Nowhere)
    }

    pub fn with_failure(fail: FailAt) -> Self {
        Self {
            fail,
            duration: Some(30.0),
            last_frame_offset: Mutex::new(None),
        }
    }

    pub fn with_duration(duration: Option<f64>) -> Self {
        Self {
            fail: FailAt::Nowhere,
            duration,
            last_frame_offset: Mutex::new(None),
        }
    }

    pub fn recorded_frame_offset(&self) -> Option<f64> {
        *self.last_frame_offset.lock().unwrap()
    }
}

#[async_trait]
impl Transcoder for StubTranscoder {
    async fn produce_streaming_set(
        &self,
        _source: &Path,
        dest_dir: &Path,
    ) -> Result<(), TranscodeError> {
        if self.fail == FailAt::StreamingSet {
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
        tokio::fs::write(dest_dir.join("segment000.ts"), vec![0u8; 1024])
            .await
            .unwrap();
        Ok(())
    }

    async fn extract_frame(
        &self,
        _source: &Path,
        dest: &Path,
        offset_seconds: f64,
    ) -> Result<(), TranscodeError> {
        *self.last_frame_offset.lock().unwrap() = Some(offset_seconds);

        if self.fail == FailAt::FrameExtraction {
            return Err(TranscodeError::MissingOutput {
                tool: "ffmpeg".to_string(),
                path: dest.to_path_buf(),
            });
        }

        if self.fail == FailAt::BadFrame {
            tokio::fs::write(dest, b"not an image").await.unwrap();
            return Ok(());
        }

        let img = image::RgbImage::from_pixel(64, 36, image::Rgb([200, 40, 40]));
        img.save(dest).unwrap();
        Ok(())
    }

    async fn probe_duration(&self, _source: &Path) -> Result<Option<f64>, TranscodeError> {
        Ok(self.duration)
    }
}

/// One isolated record store + artifact store pair.
pub struct TestHarness {
    pub repo: MediaRepository,
    pub store: ArtifactStore,
    pub pool: sqlx::SqlitePool,
    pub tmp: TempDir,
}

pub async fn harness() -> TestHarness {
    let pool = connect_in_memory().await.unwrap();
    let repo = MediaRepository::new(pool.clone());
    let tmp = TempDir::new().unwrap();
    let store = ArtifactStore::new(tmp.path().join("videos")).await.unwrap();
    TestHarness {
        repo,
        store,
        pool,
        tmp,
    }
}

pub fn pipeline(h: &TestHarness, transcoder: Arc<dyn Transcoder>) -> IngestionPipeline {
    IngestionPipeline::new(
        h.repo.clone(),
        h.store.clone(),
        transcoder,
        ThumbnailProcessor::new(640, 360, 80),
        IngestOptions {
            public_base_url: String::new(),
            frame_offset_secs: 2.0,
            max_concurrent_transcodes: 2,
        },
    )
}

/// Spool a fake raw upload to disk and describe it for the pipeline.
pub async fn spool_upload(h: &TestHarness, filename: &str) -> UploadedVideo {
    let incoming = h.tmp.path().join("incoming");
    tokio::fs::create_dir_all(&incoming).await.unwrap();
    let source_path: PathBuf = incoming.join(format!("file-{}.mp4", Uuid::new_v4()));
    tokio::fs::write(&source_path, vec![0u8; 4096]).await.unwrap();

    UploadedVideo {
        source_path,
        original_filename: filename.to_string(),
        description: None,
        uploader_id: None,
    }
}
