//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use vodstore_core::Config;
use vodstore_db::MediaRepository;
use vodstore_processing::{
    FfmpegTranscoder, IngestOptions, IngestionPipeline, IntegrityReconciler, ThumbnailProcessor,
    Transcoder, UploadValidator,
};
use vodstore_storage::ArtifactStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub repository: MediaRepository,
    pub artifacts: ArtifactStore,
    pub pipeline: Arc<IngestionPipeline>,
    pub reconciler: Arc<IntegrityReconciler>,
    pub validator: Arc<UploadValidator>,
}

impl AppState {
    /// Assemble the state from its parts. The transcoder is injected so
    /// tests can substitute a stub for the ffmpeg binary.
    pub fn new(
        config: Config,
        pool: SqlitePool,
        artifacts: ArtifactStore,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        let repository = MediaRepository::new(pool);

        let thumbnailer = ThumbnailProcessor::new(
            config.thumbnail_width,
            config.thumbnail_height,
            config.thumbnail_quality,
        );

        let pipeline = Arc::new(IngestionPipeline::new(
            repository.clone(),
            artifacts.clone(),
            transcoder,
            thumbnailer,
            IngestOptions {
                public_base_url: config.public_base_url.clone(),
                frame_offset_secs: config.frame_offset_secs,
                max_concurrent_transcodes: config.max_concurrent_transcodes,
            },
        ));

        let reconciler = Arc::new(IntegrityReconciler::new(
            repository.clone(),
            artifacts.clone(),
        ));

        let validator = Arc::new(UploadValidator::new(
            config.max_video_size_bytes,
            config.video_allowed_extensions.clone(),
            config.video_allowed_content_types.clone(),
        ));

        Self {
            config,
            repository,
            artifacts,
            pipeline,
            reconciler,
            validator,
        }
    }

    /// Production transcoder built from the config.
    pub fn ffmpeg_transcoder(config: &Config) -> FfmpegTranscoder {
        FfmpegTranscoder::new(
            config.ffmpeg_path.clone(),
            config.ffprobe_path.clone(),
            config.hls_segment_duration,
            Duration::from_secs(config.transcode_timeout_secs),
        )
    }
}
