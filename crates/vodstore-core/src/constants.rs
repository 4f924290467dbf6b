//! Shared constants: artifact file names and record defaults.

/// Entry-point playlist inside an artifact directory.
pub const PLAYLIST_FILE_NAME: &str = "index.m3u8";

/// Final thumbnail image inside an artifact directory.
pub const THUMBNAIL_FILE_NAME: &str = "thumbnail.jpg";

/// Intermediate extracted frame; deleted after thumbnail processing.
pub const FRAME_FILE_NAME: &str = "frame.jpg";

/// ffmpeg segment filename pattern (expands to segment000.ts, segment001.ts, ...).
pub const SEGMENT_FILE_PATTERN: &str = "segment%03d.ts";

/// Public URL prefix under which artifact directories are served.
pub const PUBLIC_VIDEO_PREFIX: &str = "/uploads/videos";

/// Description stored when the uploader provides none.
pub const DEFAULT_DESCRIPTION: &str = "No description";

/// Uploader identity stored when the uploader provides none.
pub const ANONYMOUS_UPLOADER: &str = "anonymous";
