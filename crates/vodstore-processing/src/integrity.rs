//! Integrity reconciliation between the record store and the artifact
//! store.
//!
//! The only link between a media record and its on-disk artifacts is the
//! artifact identifier embedded in the record's public paths, so drift is
//! expected: failed ingestions leave directories with no record, and
//! out-of-band file deletion leaves records with no files. The reconciler
//! reports both and, only under explicit confirmation, deletes records
//! whose artifacts are gone. It never deletes automatically: a timer-based
//! sweep could destroy records for ingestions that simply have not reached
//! the persistence stage yet.

use std::sync::Arc;

use tokio::sync::Mutex;

use vodstore_core::models::{
    extract_artifact_id, CleanupRecord, CleanupResult, IntegrityEntry, IntegrityReport,
    IntegritySummary, MediaRecord, RecordStatus,
};
use vodstore_core::AppError;
use vodstore_db::MediaRepository;
use vodstore_storage::ArtifactStore;

pub struct IntegrityReconciler {
    repository: MediaRepository,
    artifacts: ArtifactStore,
    /// Serializes reconciliation runs; concurrent runs would only duplicate
    /// work, but the guard keeps reports and cleanups from interleaving.
    guard: Arc<Mutex<()>>,
}

impl IntegrityReconciler {
    pub fn new(repository: MediaRepository, artifacts: ArtifactStore) -> Self {
        Self {
            repository,
            artifacts,
            guard: Arc::new(Mutex::new(())),
        }
    }

    /// Cross-check every record against the artifact store.
    #[tracing::instrument(skip(self))]
    pub async fn audit(&self) -> Result<IntegrityReport, AppError> {
        let _lock = self.guard.lock().await;

        let records = self.repository.list_all().await?;
        let mut details = Vec::with_capacity(records.len());
        for record in &records {
            details.push(self.inspect(record).await);
        }

        let good = details
            .iter()
            .filter(|d| d.status == RecordStatus::Good)
            .count();
        let summary = IntegritySummary {
            total: details.len(),
            good,
            broken: details.len() - good,
        };

        tracing::info!(
            total = summary.total,
            good = summary.good,
            broken = summary.broken,
            "Integrity audit complete"
        );

        Ok(IntegrityReport { summary, details })
    }

    /// Delete records classified `MISSING_FILES`. Without `confirmed` this
    /// is a dry run: the candidate list is returned and nothing is
    /// mutated. Per-record delete failures are logged and counted but do
    /// not abort the rest of the batch.
    #[tracing::instrument(skip(self))]
    pub async fn cleanup(&self, confirmed: bool) -> Result<CleanupResult, AppError> {
        let _lock = self.guard.lock().await;

        let records = self.repository.list_all().await?;
        let mut affected = Vec::new();
        let mut failed_deletes = 0usize;

        for record in records {
            let entry = self.inspect(&record).await;
            if entry.status != RecordStatus::MissingFiles {
                continue;
            }

            let candidate = CleanupRecord {
                video_id: record.id,
                title: record.title.clone(),
                video_path: record.video_path.clone(),
            };

            if !confirmed {
                affected.push(candidate);
                continue;
            }

            match self.repository.delete(record.id).await {
                Ok(()) => {
                    tracing::info!(video_id = %record.id, "Deleted orphaned media record");
                    affected.push(candidate);
                }
                // Already gone (e.g. deleted out-of-band since the scan):
                // nothing to report, deletion is idempotent.
                Err(AppError::NotFound(_)) => {
                    tracing::debug!(video_id = %record.id, "Orphaned record already deleted");
                }
                Err(e) => {
                    tracing::error!(video_id = %record.id, error = %e, "Failed to delete orphaned record");
                    failed_deletes += 1;
                }
            }
        }

        tracing::info!(
            dry_run = !confirmed,
            affected = affected.len(),
            failed_deletes,
            "Orphan cleanup complete"
        );

        Ok(CleanupResult {
            dry_run: !confirmed,
            records: affected,
            failed_deletes,
        })
    }

    /// Classify one record. A record is GOOD only when its entry-point
    /// playlist and thumbnail both exist and its stored path still embeds
    /// the artifact identifier it was written with; malformed or edited
    /// path strings surface through `extracted_video_id` and classify as
    /// MISSING_FILES rather than failing the audit.
    async fn inspect(&self, record: &MediaRecord) -> IntegrityEntry {
        let artifact_id = record.artifact_id;
        let extracted = extract_artifact_id(&record.video_path);

        let dir_exists = self.artifacts.dir_exists(artifact_id).await;
        let video_exists = dir_exists && self.artifacts.playlist_exists(artifact_id).await;
        let thumbnail_exists = dir_exists && self.artifacts.thumbnail_exists(artifact_id).await;

        let dir_contents = match self.artifacts.list_contents(artifact_id).await {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(artifact_id = %artifact_id, error = %e, "Failed to list artifact directory");
                Vec::new()
            }
        };

        let path_intact = extracted == Some(artifact_id);
        if !path_intact {
            tracing::warn!(
                video_id = %record.id,
                video_path = %record.video_path,
                extracted = ?extracted,
                "Stored video path does not match record's artifact id"
            );
        }

        let status = if video_exists && thumbnail_exists && path_intact {
            RecordStatus::Good
        } else {
            RecordStatus::MissingFiles
        };

        IntegrityEntry {
            video_id: record.id,
            title: record.title.clone(),
            video_path: record.video_path.clone(),
            thumbnail_path: record.thumbnail_path.clone(),
            extracted_video_id: extracted,
            dir_exists,
            video_exists,
            thumbnail_exists,
            dir_contents,
            status,
        }
    }
}
