//! Configuration module
//!
//! Environment-driven configuration for the server, record store, artifact
//! root, and media processing parameters.

use std::env;
use std::path::PathBuf;

const DEFAULT_SERVER_PORT: u16 = 8000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_HLS_SEGMENT_DURATION: u64 = 10;
const DEFAULT_TRANSCODE_TIMEOUT_SECS: u64 = 600;
const DEFAULT_MAX_CONCURRENT_TRANSCODES: usize = 2;
const DEFAULT_FRAME_OFFSET_SECS: f64 = 2.0;
const DEFAULT_THUMBNAIL_WIDTH: u32 = 640;
const DEFAULT_THUMBNAIL_HEIGHT: u32 = 360;
const DEFAULT_THUMBNAIL_QUALITY: u8 = 80;
const DEFAULT_MAX_VIDEO_SIZE_BYTES: usize = 1000 * 1024 * 1024;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Root directory for all media artifacts; the incoming/ and videos/
    /// subdirectories live beneath it.
    pub media_root: PathBuf,
    /// Prefix prepended to stored public paths (e.g. "http://localhost:8000").
    /// Empty means host-relative paths.
    pub public_base_url: String,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub hls_segment_duration: u64,
    pub transcode_timeout_secs: u64,
    pub max_concurrent_transcodes: usize,
    pub frame_offset_secs: f64,
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
    pub thumbnail_quality: u8,
    pub max_video_size_bytes: usize,
    pub video_allowed_extensions: Vec<String>,
    pub video_allowed_content_types: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Ok(Config {
            server_port: env_parse("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            cors_origins: env_list(
                "CORS_ORIGINS",
                &["http://localhost:5173".to_string()],
            ),
            environment: env_or("ENVIRONMENT", "development"),
            database_url: env_or("DATABASE_URL", "sqlite://vodstore.db?mode=rwc"),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            media_root: PathBuf::from(env_or("MEDIA_ROOT", "./uploads")),
            public_base_url: env_or("PUBLIC_BASE_URL", ""),
            ffmpeg_path: env_or("FFMPEG_PATH", "ffmpeg"),
            ffprobe_path: env_or("FFPROBE_PATH", "ffprobe"),
            hls_segment_duration: env_parse(
                "HLS_SEGMENT_DURATION",
                DEFAULT_HLS_SEGMENT_DURATION,
            )?,
            transcode_timeout_secs: env_parse(
                "TRANSCODE_TIMEOUT_SECS",
                DEFAULT_TRANSCODE_TIMEOUT_SECS,
            )?,
            max_concurrent_transcodes: env_parse(
                "MAX_CONCURRENT_TRANSCODES",
                DEFAULT_MAX_CONCURRENT_TRANSCODES,
            )?,
            frame_offset_secs: env_parse("FRAME_OFFSET_SECS", DEFAULT_FRAME_OFFSET_SECS)?,
            thumbnail_width: env_parse("THUMBNAIL_WIDTH", DEFAULT_THUMBNAIL_WIDTH)?,
            thumbnail_height: env_parse("THUMBNAIL_HEIGHT", DEFAULT_THUMBNAIL_HEIGHT)?,
            thumbnail_quality: env_parse("THUMBNAIL_QUALITY", DEFAULT_THUMBNAIL_QUALITY)?,
            max_video_size_bytes: env_parse(
                "MAX_VIDEO_SIZE_BYTES",
                DEFAULT_MAX_VIDEO_SIZE_BYTES,
            )?,
            video_allowed_extensions: env_list(
                "VIDEO_ALLOWED_EXTENSIONS",
                &[
                    "mp4".to_string(),
                    "webm".to_string(),
                    "ogg".to_string(),
                    "avi".to_string(),
                    "mov".to_string(),
                ],
            ),
            video_allowed_content_types: env_list(
                "VIDEO_ALLOWED_CONTENT_TYPES",
                &[
                    "video/mp4".to_string(),
                    "video/webm".to_string(),
                    "video/ogg".to_string(),
                    "video/avi".to_string(),
                    "video/mov".to_string(),
                    "video/quicktime".to_string(),
                ],
            ),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.transcode_timeout_secs == 0 {
            anyhow::bail!("TRANSCODE_TIMEOUT_SECS must be greater than zero");
        }
        if self.max_concurrent_transcodes == 0 {
            anyhow::bail!("MAX_CONCURRENT_TRANSCODES must be greater than zero");
        }
        if self.thumbnail_width == 0 || self.thumbnail_height == 0 {
            anyhow::bail!("thumbnail dimensions must be non-zero");
        }
        if !(1..=100).contains(&self.thumbnail_quality) {
            anyhow::bail!("THUMBNAIL_QUALITY must be in 1..=100");
        }
        if self.frame_offset_secs < 0.0 {
            anyhow::bail!("FRAME_OFFSET_SECS must not be negative");
        }
        if self.max_video_size_bytes == 0 {
            anyhow::bail!("MAX_VIDEO_SIZE_BYTES must be greater than zero");
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Directory where raw uploads are spooled before ingestion.
    pub fn incoming_dir(&self) -> PathBuf {
        self.media_root.join("incoming")
    }

    /// Root of the artifact store (one subdirectory per video).
    pub fn videos_dir(&self) -> PathBuf {
        self.media_root.join("videos")
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}

/// Comma-separated list variable; falls back to `default` when unset or empty.
fn env_list(key: &str, default: &[String]) -> Vec<String> {
    match env::var(key) {
        Ok(raw) => {
            let values: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if values.is_empty() {
                default.to_vec()
            } else {
                values
            }
        }
        Err(_) => default.to_vec(),
    }
}
