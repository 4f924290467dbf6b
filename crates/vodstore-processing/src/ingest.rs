//! Video ingestion pipeline: allocate artifact directory → produce HLS
//! set → extract frame → process thumbnail → persist record → clean temp
//! files.
//!
//! Stages run strictly forward; the first failing stage aborts the attempt
//! and is reported to the caller. Artifacts created before a failure are
//! deliberately left in place; reconciling them is the integrity
//! reconciler's job, which keeps this hot path free of rollback logic.
//! The record is persisted last, so a record always implies complete
//! artifacts at write time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use uuid::Uuid;

use vodstore_core::constants::{ANONYMOUS_UPLOADER, DEFAULT_DESCRIPTION};
use vodstore_core::models::{thumbnail_public_path, video_public_path, MediaRecord, NewMediaRecord};
use vodstore_core::AppError;
use vodstore_db::MediaRepository;
use vodstore_storage::ArtifactStore;

use crate::thumbnail::ThumbnailProcessor;
use crate::transcoder::{clamp_frame_offset, Transcoder};

/// Pipeline stages, in execution order. Used for log context; there are no
/// backward transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    DirectoryAllocated,
    StreamingSetProduced,
    FrameExtracted,
    ThumbnailProcessed,
    RecordPersisted,
    TempFilesCleaned,
}

impl std::fmt::Display for IngestStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IngestStage::DirectoryAllocated => "directory_allocated",
            IngestStage::StreamingSetProduced => "streaming_set_produced",
            IngestStage::FrameExtracted => "frame_extracted",
            IngestStage::ThumbnailProcessed => "thumbnail_processed",
            IngestStage::RecordPersisted => "record_persisted",
            IngestStage::TempFilesCleaned => "temp_files_cleaned",
        };
        f.write_str(name)
    }
}

/// An uploaded file handed to the pipeline: raw bytes already spooled to
/// disk plus the caller-supplied metadata.
#[derive(Debug, Clone)]
pub struct UploadedVideo {
    pub source_path: PathBuf,
    pub original_filename: String,
    pub description: Option<String>,
    pub uploader_id: Option<String>,
}

/// Pipeline tuning, derived from the application config.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub public_base_url: String,
    pub frame_offset_secs: f64,
    pub max_concurrent_transcodes: usize,
}

/// Orchestrates one ingestion per call. Concurrent ingestions are
/// independent apart from the bounded transcode slots and independent
/// record inserts.
pub struct IngestionPipeline {
    repository: MediaRepository,
    artifacts: ArtifactStore,
    transcoder: Arc<dyn Transcoder>,
    thumbnailer: ThumbnailProcessor,
    options: IngestOptions,
    transcode_slots: Arc<Semaphore>,
}

impl IngestionPipeline {
    pub fn new(
        repository: MediaRepository,
        artifacts: ArtifactStore,
        transcoder: Arc<dyn Transcoder>,
        thumbnailer: ThumbnailProcessor,
        options: IngestOptions,
    ) -> Self {
        let transcode_slots = Arc::new(Semaphore::new(options.max_concurrent_transcodes.max(1)));
        Self {
            repository,
            artifacts,
            transcoder,
            thumbnailer,
            options,
            transcode_slots,
        }
    }

    /// Run the full pipeline for one upload. On success the raw upload and
    /// the intermediate frame are gone and the returned record is durable.
    #[tracing::instrument(skip(self, upload), fields(filename = %upload.original_filename))]
    pub async fn ingest(&self, upload: UploadedVideo) -> Result<MediaRecord, AppError> {
        let artifact_id = Uuid::new_v4();
        tracing::info!(artifact_id = %artifact_id, "Starting video ingestion");

        let dest_dir = self
            .artifacts
            .allocate(artifact_id)
            .await
            .map_err(|e| self.stage_failed(artifact_id, IngestStage::DirectoryAllocated, AppError::Storage(e.to_string())))?;

        // Transcoding dominates latency; hold a slot for both external
        // invocations and the thumbnail encode.
        let _permit = self
            .transcode_slots
            .acquire()
            .await
            .map_err(|_| AppError::Internal("transcode queue closed".to_string()))?;

        self.transcoder
            .produce_streaming_set(&upload.source_path, &dest_dir)
            .await
            .map_err(|e| self.stage_failed(artifact_id, IngestStage::StreamingSetProduced, e.into()))?;
        tracing::info!(artifact_id = %artifact_id, stage = %IngestStage::StreamingSetProduced, "HLS set produced");

        let offset = self.frame_offset(&upload.source_path).await;
        let frame_path = self.artifacts.frame_path(artifact_id);
        self.transcoder
            .extract_frame(&upload.source_path, &frame_path, offset)
            .await
            .map_err(|e| self.stage_failed(artifact_id, IngestStage::FrameExtracted, e.into()))?;
        tracing::info!(artifact_id = %artifact_id, stage = %IngestStage::FrameExtracted, offset, "Frame extracted");

        let thumbnail_path = self.artifacts.thumbnail_path(artifact_id);
        self.thumbnailer
            .process(&frame_path, &thumbnail_path)
            .await
            .map_err(|e| {
                self.stage_failed(
                    artifact_id,
                    IngestStage::ThumbnailProcessed,
                    AppError::ImageProcessing(e.to_string()),
                )
            })?;
        tracing::info!(artifact_id = %artifact_id, stage = %IngestStage::ThumbnailProcessed, "Thumbnail processed");

        let record = self
            .repository
            .create(NewMediaRecord {
                artifact_id,
                title: upload.original_filename.clone(),
                description: upload
                    .description
                    .clone()
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
                video_path: video_public_path(&self.options.public_base_url, artifact_id),
                thumbnail_path: thumbnail_public_path(&self.options.public_base_url, artifact_id),
                uploader_id: upload
                    .uploader_id
                    .clone()
                    .filter(|u| !u.trim().is_empty())
                    .unwrap_or_else(|| ANONYMOUS_UPLOADER.to_string()),
            })
            .await
            .map_err(|e| self.stage_failed(artifact_id, IngestStage::RecordPersisted, e))?;

        self.cleanup_temp_files(&upload.source_path, &frame_path).await;

        tracing::info!(
            video_id = %record.id,
            artifact_id = %artifact_id,
            stage = %IngestStage::TempFilesCleaned,
            "Video ingestion complete"
        );

        Ok(record)
    }

    /// Offset for frame extraction, clamped to the probed source duration.
    /// Probe failures degrade to the configured offset rather than failing
    /// the ingestion.
    async fn frame_offset(&self, source: &Path) -> f64 {
        let duration = match self.transcoder.probe_duration(source).await {
            Ok(duration) => duration,
            Err(e) => {
                tracing::warn!(error = %e, source = %source.display(), "Duration probe failed, using configured frame offset");
                None
            }
        };
        clamp_frame_offset(self.options.frame_offset_secs, duration)
    }

    /// Best-effort removal of the raw upload and the intermediate frame.
    /// Failures are logged, never fatal: the ingestion already succeeded.
    async fn cleanup_temp_files(&self, source: &Path, frame: &Path) {
        for path in [source, frame] {
            if let Err(e) = tokio::fs::remove_file(path).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to delete temporary file");
                }
            }
        }
    }

    fn stage_failed(&self, artifact_id: Uuid, stage: IngestStage, error: AppError) -> AppError {
        tracing::error!(
            artifact_id = %artifact_id,
            stage = %stage,
            error = %error,
            detail = %error.detailed_message(),
            "Video ingestion failed; artifacts left for reconciliation"
        );
        error
    }
}
