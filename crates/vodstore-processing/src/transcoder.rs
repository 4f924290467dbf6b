//! External transcoder invocation (ffmpeg/ffprobe).
//!
//! Every invocation follows the same contract: run the tool, treat a
//! non-zero exit as failure carrying the tool's stderr, and verify the
//! expected output file actually exists afterwards; a zero exit code is
//! necessary but not sufficient. A wall-clock timeout bounds each run; the
//! child is killed when it expires.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use vodstore_core::constants::{PLAYLIST_FILE_NAME, SEGMENT_FILE_PATTERN};
use vodstore_core::AppError;

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("{tool} {message}")]
    Failed {
        tool: String,
        message: String,
        /// Captured stderr of the tool.
        stderr: String,
    },

    #[error("{tool} reported success but produced no output at {path}")]
    MissingOutput { tool: String, path: PathBuf },

    #[error("{tool} timed out after {timeout:?}")]
    Timeout { tool: String, timeout: Duration },

    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<TranscodeError> for AppError {
    fn from(err: TranscodeError) -> Self {
        match err {
            TranscodeError::Timeout { timeout, .. } => AppError::TranscodeTimeout {
                timeout_secs: timeout.as_secs(),
            },
            TranscodeError::Failed {
                ref tool,
                ref message,
                ref stderr,
            } => AppError::Transcode {
                message: format!("{} {}", tool, message),
                detail: stderr.clone(),
            },
            other => AppError::Transcode {
                message: other.to_string(),
                detail: String::new(),
            },
        }
    }
}

/// Transcoding capability consumed by the ingestion pipeline.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Produce the HLS playlist and segments for `source` inside `dest_dir`.
    async fn produce_streaming_set(
        &self,
        source: &Path,
        dest_dir: &Path,
    ) -> Result<(), TranscodeError>;

    /// Extract a single still frame at `offset_seconds` into `dest`.
    async fn extract_frame(
        &self,
        source: &Path,
        dest: &Path,
        offset_seconds: f64,
    ) -> Result<(), TranscodeError>;

    /// Source duration in seconds, when the tool can determine it.
    async fn probe_duration(&self, source: &Path) -> Result<Option<f64>, TranscodeError>;
}

/// ffmpeg-backed transcoder.
pub struct FfmpegTranscoder {
    ffmpeg_path: String,
    ffprobe_path: String,
    segment_duration: u64,
    timeout: Duration,
}

impl FfmpegTranscoder {
    pub fn new(
        ffmpeg_path: String,
        ffprobe_path: String,
        segment_duration: u64,
        timeout: Duration,
    ) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            segment_duration,
            timeout,
        }
    }

    /// Startup check that the configured ffmpeg binary is runnable.
    pub async fn verify_available(&self) -> Result<(), TranscodeError> {
        let output = Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| TranscodeError::Spawn {
                tool: "ffmpeg".to_string(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(TranscodeError::Failed {
                tool: "ffmpeg".to_string(),
                message: format!("-version exited with {}", output.status),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }

    pub(crate) fn streaming_args(&self, source: &Path, dest_dir: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            source.to_string_lossy().into_owned(),
            "-codec:v".to_string(),
            "libx264".to_string(),
            "-codec:a".to_string(),
            "aac".to_string(),
            "-hls_time".to_string(),
            self.segment_duration.to_string(),
            "-hls_playlist_type".to_string(),
            "vod".to_string(),
            "-hls_segment_filename".to_string(),
            dest_dir.join(SEGMENT_FILE_PATTERN).to_string_lossy().into_owned(),
            "-y".to_string(),
            dest_dir.join(PLAYLIST_FILE_NAME).to_string_lossy().into_owned(),
        ]
    }

    pub(crate) fn frame_args(&self, source: &Path, dest: &Path, offset_seconds: f64) -> Vec<String> {
        vec![
            "-ss".to_string(),
            format!("{:.3}", offset_seconds),
            "-i".to_string(),
            source.to_string_lossy().into_owned(),
            "-vframes".to_string(),
            "1".to_string(),
            "-y".to_string(),
            dest.to_string_lossy().into_owned(),
        ]
    }

    /// Run a tool invocation and verify that `expected_output` exists after
    /// a reported success.
    async fn run_verified(
        &self,
        tool: &str,
        program: &str,
        args: &[String],
        expected_output: &Path,
    ) -> Result<(), TranscodeError> {
        tracing::debug!(tool, ?args, "Invoking external transcoder");

        let child = Command::new(program)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TranscodeError::Spawn {
                tool: tool.to_string(),
                source: e,
            })?;

        // Dropping the future on timeout kills the child (kill_on_drop).
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| TranscodeError::Spawn {
                tool: tool.to_string(),
                source: e,
            })?,
            Err(_) => {
                tracing::warn!(tool, timeout = ?self.timeout, "Transcoder invocation timed out");
                return Err(TranscodeError::Timeout {
                    tool: tool.to_string(),
                    timeout: self.timeout,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::error!(tool, status = %output.status, stderr = %stderr, "Transcoder invocation failed");
            return Err(TranscodeError::Failed {
                tool: tool.to_string(),
                message: format!("exited with {}", output.status),
                stderr,
            });
        }

        if !tokio::fs::try_exists(expected_output).await.unwrap_or(false) {
            tracing::error!(
                tool,
                expected = %expected_output.display(),
                "Transcoder reported success but expected output is missing"
            );
            return Err(TranscodeError::MissingOutput {
                tool: tool.to_string(),
                path: expected_output.to_path_buf(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn produce_streaming_set(
        &self,
        source: &Path,
        dest_dir: &Path,
    ) -> Result<(), TranscodeError> {
        let args = self.streaming_args(source, dest_dir);
        self.run_verified(
            "ffmpeg",
            &self.ffmpeg_path,
            &args,
            &dest_dir.join(PLAYLIST_FILE_NAME),
        )
        .await
    }

    async fn extract_frame(
        &self,
        source: &Path,
        dest: &Path,
        offset_seconds: f64,
    ) -> Result<(), TranscodeError> {
        let args = self.frame_args(source, dest, offset_seconds);
        self.run_verified("ffmpeg", &self.ffmpeg_path, &args, dest).await
    }

    async fn probe_duration(&self, source: &Path) -> Result<Option<f64>, TranscodeError> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(source)
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| TranscodeError::Spawn {
                tool: "ffprobe".to_string(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(TranscodeError::Failed {
                tool: "ffprobe".to_string(),
                message: format!("exited with {}", output.status),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.trim().parse::<f64>().ok())
    }
}

/// Frame offset actually used for thumbnail extraction: the configured
/// offset, clamped to the source duration for sources shorter than the
/// nominal mark, never negative.
pub fn clamp_frame_offset(configured: f64, duration: Option<f64>) -> f64 {
    let offset = match duration {
        Some(duration) => configured.min(duration),
        None => configured,
    };
    offset.max(0.0)
}
