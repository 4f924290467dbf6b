//! Thumbnail processing: resize the extracted frame to fixed dimensions
//! and encode it as JPEG.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("failed to read frame {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode frame {path}: {message}")]
    DecodeFailed { path: PathBuf, message: String },

    #[error("failed to write thumbnail {path}: {message}")]
    WriteFailed { path: PathBuf, message: String },

    #[error("thumbnail missing after encode: {path}")]
    MissingOutput { path: PathBuf },

    #[error("thumbnail task failed: {0}")]
    TaskFailed(String),
}

/// Deterministic resize + JPEG encode of the extracted frame.
#[derive(Clone, Copy)]
pub struct ThumbnailProcessor {
    width: u32,
    height: u32,
    quality: u8,
}

impl ThumbnailProcessor {
    pub fn new(width: u32, height: u32, quality: u8) -> Self {
        Self {
            width,
            height,
            quality,
        }
    }

    /// Produce the thumbnail at `dest_path` from `frame_path`. Decode and
    /// encode run on the blocking pool; the output file's existence is
    /// verified afterwards, mirroring the transcoder's contract.
    pub async fn process(&self, frame_path: &Path, dest_path: &Path) -> Result<(), ImageError> {
        let frame = frame_path.to_path_buf();
        let dest = dest_path.to_path_buf();
        let (width, height, quality) = (self.width, self.height, self.quality);

        tokio::task::spawn_blocking(move || render_thumbnail(&frame, &dest, width, height, quality))
            .await
            .map_err(|e| ImageError::TaskFailed(e.to_string()))??;

        if !tokio::fs::try_exists(dest_path).await.unwrap_or(false) {
            return Err(ImageError::MissingOutput {
                path: dest_path.to_path_buf(),
            });
        }

        tracing::debug!(
            frame = %frame_path.display(),
            thumbnail = %dest_path.display(),
            width,
            height,
            "Thumbnail processed"
        );

        Ok(())
    }
}

fn render_thumbnail(
    frame: &Path,
    dest: &Path,
    width: u32,
    height: u32,
    quality: u8,
) -> Result<(), ImageError> {
    let reader = image::ImageReader::open(frame)
        .map_err(|e| ImageError::ReadFailed {
            path: frame.to_path_buf(),
            source: e,
        })?
        .with_guessed_format()
        .map_err(|e| ImageError::ReadFailed {
            path: frame.to_path_buf(),
            source: e,
        })?;

    let img = reader.decode().map_err(|e| ImageError::DecodeFailed {
        path: frame.to_path_buf(),
        message: e.to_string(),
    })?;

    let resized = img.resize_exact(width, height, FilterType::Lanczos3);

    let file = std::fs::File::create(dest).map_err(|e| ImageError::WriteFailed {
        path: dest.to_path_buf(),
        message: e.to_string(),
    })?;
    let writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality);

    resized
        .write_with_encoder(encoder)
        .map_err(|e| ImageError::WriteFailed {
            path: dest.to_path_buf(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    fn write_test_frame(path: &Path, width: u32, height: u32) {
        let mut img = RgbImage::new(width, height);
        for (x, _, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x % 256) as u8, 64, 128]);
        }
        img.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_process_resizes_to_target_dimensions() {
        let dir = tempdir().unwrap();
        let frame = dir.path().join("frame.png");
        let thumb = dir.path().join("thumbnail.jpg");
        write_test_frame(&frame, 1280, 720);

        let processor = ThumbnailProcessor::new(640, 360, 80);
        processor.process(&frame, &thumb).await.unwrap();

        let out = image::open(&thumb).unwrap();
        assert_eq!(out.width(), 640);
        assert_eq!(out.height(), 360);
    }

    #[tokio::test]
    async fn test_process_upscales_small_frames() {
        let dir = tempdir().unwrap();
        let frame = dir.path().join("frame.png");
        let thumb = dir.path().join("thumbnail.jpg");
        write_test_frame(&frame, 320, 180);

        let processor = ThumbnailProcessor::new(640, 360, 80);
        processor.process(&frame, &thumb).await.unwrap();

        let out = image::open(&thumb).unwrap();
        assert_eq!(out.width(), 640);
        assert_eq!(out.height(), 360);
    }

    #[tokio::test]
    async fn test_process_missing_frame_fails() {
        let dir = tempdir().unwrap();
        let processor = ThumbnailProcessor::new(640, 360, 80);

        let result = processor
            .process(&dir.path().join("nope.jpg"), &dir.path().join("out.jpg"))
            .await;
        assert!(matches!(result, Err(ImageError::ReadFailed { .. })));
    }

    #[tokio::test]
    async fn test_process_unreadable_frame_fails() {
        let dir = tempdir().unwrap();
        let frame = dir.path().join("frame.jpg");
        std::fs::write(&frame, b"this is not an image").unwrap();

        let processor = ThumbnailProcessor::new(640, 360, 80);
        let result = processor.process(&frame, &dir.path().join("out.jpg")).await;
        assert!(matches!(
            result,
            Err(ImageError::DecodeFailed { .. }) | Err(ImageError::ReadFailed { .. })
        ));
    }
}
