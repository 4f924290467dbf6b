use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use vodstore_core::models::{MediaRecord, NewMediaRecord};
use vodstore_core::AppError;

/// Raw row shape; identifiers are stored as TEXT and parsed at the domain
/// boundary.
#[derive(Debug, sqlx::FromRow)]
struct MediaRecordRow {
    id: String,
    artifact_id: String,
    title: String,
    description: String,
    video_path: String,
    thumbnail_path: String,
    uploader_id: String,
    created_at: DateTime<Utc>,
}

impl MediaRecordRow {
    fn into_record(self) -> Result<MediaRecord, AppError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| AppError::Internal(format!("corrupt media record id {:?}: {}", self.id, e)))?;
        let artifact_id = Uuid::parse_str(&self.artifact_id).map_err(|e| {
            AppError::Internal(format!(
                "corrupt artifact id {:?} on record {}: {}",
                self.artifact_id, id, e
            ))
        })?;

        Ok(MediaRecord {
            id,
            artifact_id,
            title: self.title,
            description: self.description,
            video_path: self.video_path,
            thumbnail_path: self.thumbnail_path,
            uploader_id: self.uploader_id,
            created_at: self.created_at,
        })
    }
}

/// Durable CRUD over media records.
///
/// No uniqueness constraints beyond identity and no foreign-key enforcement
/// against the artifact store; the stores are coupled only through the path
/// strings carried by each record.
#[derive(Clone)]
pub struct MediaRepository {
    pool: SqlitePool,
}

impl MediaRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new record, assigning identity and creation timestamp.
    #[tracing::instrument(
        skip(self, new),
        fields(db.table = "media_records", db.operation = "insert")
    )]
    pub async fn create(&self, new: NewMediaRecord) -> Result<MediaRecord, AppError> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO media_records (
                id, artifact_id, title, description,
                video_path, thumbnail_path, uploader_id, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(id.to_string())
        .bind(new.artifact_id.to_string())
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.video_path)
        .bind(&new.thumbnail_path)
        .bind(&new.uploader_id)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        tracing::info!(video_id = %id, artifact_id = %new.artifact_id, "Media record created");

        Ok(MediaRecord {
            id,
            artifact_id: new.artifact_id,
            title: new.title,
            description: new.description,
            video_path: new.video_path,
            thumbnail_path: new.thumbnail_path,
            uploader_id: new.uploader_id,
            created_at,
        })
    }

    /// All records, newest first.
    #[tracing::instrument(
        skip(self),
        fields(db.table = "media_records", db.operation = "select")
    )]
    pub async fn list_all(&self) -> Result<Vec<MediaRecord>, AppError> {
        let rows: Vec<MediaRecordRow> = sqlx::query_as(
            "SELECT * FROM media_records ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MediaRecordRow::into_record).collect()
    }

    #[tracing::instrument(
        skip(self),
        fields(db.table = "media_records", db.operation = "select", video_id = %id)
    )]
    pub async fn get(&self, id: Uuid) -> Result<Option<MediaRecord>, AppError> {
        let row: Option<MediaRecordRow> =
            sqlx::query_as("SELECT * FROM media_records WHERE id = ?1")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(MediaRecordRow::into_record).transpose()
    }

    /// Delete one record. Returns `NotFound` when no row matched, so
    /// repeated deletes of the same id are observable but harmless.
    #[tracing::instrument(
        skip(self),
        fields(db.table = "media_records", db.operation = "delete", video_id = %id)
    )]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM media_records WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Video {} not found", id)));
        }

        tracing::info!(video_id = %id, "Media record deleted");
        Ok(())
    }
}
