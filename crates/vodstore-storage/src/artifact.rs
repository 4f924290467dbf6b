use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

use vodstore_core::constants::{FRAME_FILE_NAME, PLAYLIST_FILE_NAME, THUMBNAIL_FILE_NAME};

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create directory {path}: {source}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read directory {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid artifact file name: {0}")]
    InvalidFileName(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Local filesystem artifact store.
///
/// All side effects are confined beneath a single root directory; each
/// video only ever touches its own subdirectory, so concurrent ingestions
/// need no locking here.
#[derive(Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `root`, creating the root (and any missing
    /// parents) eagerly so a misconfigured path fails at startup rather
    /// than mid-ingestion.
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::CreateFailed {
                path: root.clone(),
                source: e,
            })?;

        Ok(ArtifactStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for one artifact. The identifier is a UUID, so the path
    /// cannot escape the root.
    pub fn dir_path(&self, artifact_id: Uuid) -> PathBuf {
        self.root.join(artifact_id.to_string())
    }

    pub fn playlist_path(&self, artifact_id: Uuid) -> PathBuf {
        self.dir_path(artifact_id).join(PLAYLIST_FILE_NAME)
    }

    pub fn thumbnail_path(&self, artifact_id: Uuid) -> PathBuf {
        self.dir_path(artifact_id).join(THUMBNAIL_FILE_NAME)
    }

    pub fn frame_path(&self, artifact_id: Uuid) -> PathBuf {
        self.dir_path(artifact_id).join(FRAME_FILE_NAME)
    }

    /// Allocate the directory for a new artifact.
    pub async fn allocate(&self, artifact_id: Uuid) -> StorageResult<PathBuf> {
        let dir = self.dir_path(artifact_id);

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::CreateFailed {
                path: dir.clone(),
                source: e,
            })?;

        tracing::info!(
            artifact_id = %artifact_id,
            path = %dir.display(),
            "Artifact directory allocated"
        );

        Ok(dir)
    }

    pub async fn dir_exists(&self, artifact_id: Uuid) -> bool {
        fs::try_exists(self.dir_path(artifact_id))
            .await
            .unwrap_or(false)
    }

    pub async fn playlist_exists(&self, artifact_id: Uuid) -> bool {
        fs::try_exists(self.playlist_path(artifact_id))
            .await
            .unwrap_or(false)
    }

    pub async fn thumbnail_exists(&self, artifact_id: Uuid) -> bool {
        fs::try_exists(self.thumbnail_path(artifact_id))
            .await
            .unwrap_or(false)
    }

    /// List the file names inside an artifact directory, sorted. A missing
    /// directory yields an empty list; only reading an existing directory
    /// can fail.
    pub async fn list_contents(&self, artifact_id: Uuid) -> StorageResult<Vec<String>> {
        let dir = self.dir_path(artifact_id);

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    path: dir,
                    source: e,
                })
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::ReadFailed {
                path: dir.clone(),
                source: e,
            })?
        {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        Ok(names)
    }

    /// Resolve a file inside an artifact directory for delivery, rejecting
    /// names that could traverse out of it.
    pub fn resolve_file(&self, artifact_id: Uuid, file_name: &str) -> StorageResult<PathBuf> {
        if file_name.is_empty()
            || file_name.contains("..")
            || file_name.contains('/')
            || file_name.contains('\\')
        {
            return Err(StorageError::InvalidFileName(file_name.to_string()));
        }

        Ok(self.dir_path(artifact_id).join(file_name))
    }
}
