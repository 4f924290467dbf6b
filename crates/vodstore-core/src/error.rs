//! Error types module
//!
//! All errors are unified under the `AppError` enum, which self-describes
//! its HTTP presentation (status code, machine-readable code, client
//! message, log level) so the API layer can render every failure the same
//! way.

use std::io;

use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected errors like validation failures
    Debug,
    /// Recoverable issues
    Warn,
    /// Unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Transcode error: {message}")]
    Transcode {
        message: String,
        /// Full diagnostic output of the external tool (stderr).
        detail: String,
    },

    #[error("Transcode timed out after {timeout_secs}s")]
    TranscodeTimeout { timeout_secs: u64 },

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

impl AppError {
    /// HTTP status code to return
    pub fn http_status_code(&self) -> u16 {
        match self {
            AppError::Database(_) => 500,
            AppError::Storage(_) => 500,
            AppError::Transcode { .. } => 500,
            AppError::TranscodeTimeout { .. } => 500,
            AppError::ImageProcessing(_) => 500,
            AppError::InvalidInput(_) => 400,
            AppError::NotFound(_) => 404,
            AppError::PayloadTooLarge(_) => 413,
            AppError::Internal(_) => 500,
        }
    }

    /// Machine-readable error code (e.g. "TRANSCODE_ERROR")
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Transcode { .. } => "TRANSCODE_ERROR",
            AppError::TranscodeTimeout { .. } => "TRANSCODE_TIMEOUT",
            AppError::ImageProcessing(_) => "IMAGE_PROCESSING_ERROR",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying the same request can reasonably succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Database(_) | AppError::TranscodeTimeout { .. }
        )
    }

    /// Client-facing message (may differ from the internal error message)
    pub fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Error saving video metadata".to_string(),
            AppError::Storage(msg) => format!("Storage error: {}", msg),
            AppError::Transcode { message, .. } => {
                format!("Error processing video: {}", message)
            }
            AppError::TranscodeTimeout { timeout_secs } => {
                format!("Video processing timed out after {}s", timeout_secs)
            }
            AppError::ImageProcessing(msg) => format!("Error processing thumbnail: {}", msg),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::PayloadTooLarge(msg) => format!("File too large: {}", msg),
            AppError::Internal(_) => "An unexpected error occurred".to_string(),
        }
    }

    /// Diagnostic detail suitable for non-production responses and logs
    /// (transcoder stderr, database error text, ...).
    pub fn detailed_message(&self) -> String {
        match self {
            AppError::Database(err) => err.to_string(),
            AppError::Transcode { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }

    /// Whether details should be hidden in production
    pub fn is_sensitive(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::Internal(_))
    }

    /// Log level for this error
    pub fn log_level(&self) -> LogLevel {
        match self {
            AppError::InvalidInput(_) | AppError::NotFound(_) | AppError::PayloadTooLarge(_) => {
                LogLevel::Debug
            }
            AppError::TranscodeTimeout { .. } => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }

    /// Variant name, for structured log fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::Transcode { .. } => "Transcode",
            AppError::TranscodeTimeout { .. } => "TranscodeTimeout",
            AppError::ImageProcessing(_) => "ImageProcessing",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) => "Internal",
        }
    }
}
