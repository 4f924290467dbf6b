//! Video processing: transcoder invocation, thumbnailing, upload
//! validation, the ingestion pipeline, and the integrity reconciler.

pub mod ingest;
pub mod integrity;
pub mod thumbnail;
pub mod transcoder;
pub mod validator;

pub use ingest::{IngestOptions, IngestStage, IngestionPipeline, UploadedVideo};
pub use integrity::IntegrityReconciler;
pub use thumbnail::{ImageError, ThumbnailProcessor};
pub use transcoder::{clamp_frame_offset, FfmpegTranscoder, TranscodeError, Transcoder};
pub use validator::{UploadValidator, ValidationError};
