//! Ingestion pipeline behavior: stage ordering, failure handling, and the
//! deferred-orphan model.

mod helpers;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use helpers::{harness, pipeline, spool_upload, FailAt, StubTranscoder};
use vodstore_core::AppError;

#[tokio::test]
async fn test_successful_ingestion_produces_consistent_state() {
    let h = harness().await;
    let p = pipeline(&h, Arc::new(StubTranscoder::ok()));

    let upload = spool_upload(&h, "holiday.mp4").await;
    let record = p.ingest(upload.clone()).await.unwrap();

    assert_eq!(record.title, "holiday.mp4");
    assert_eq!(record.description, "No description");
    assert_eq!(record.uploader_id, "anonymous");
    assert_eq!(
        record.video_path,
        format!("/uploads/videos/{}/index.m3u8", record.artifact_id)
    );
    assert_eq!(
        record.thumbnail_path,
        format!("/uploads/videos/{}/thumbnail.jpg", record.artifact_id)
    );

    // Artifacts on disk.
    assert!(h.store.playlist_exists(record.artifact_id).await);
    assert!(h.store.thumbnail_exists(record.artifact_id).await);

    // Temp files gone.
    assert!(!upload.source_path.exists());
    assert!(!h.store.frame_path(record.artifact_id).exists());

    // Record persisted.
    let fetched = h.repo.get(record.id).await.unwrap().unwrap();
    assert_eq!(fetched.artifact_id, record.artifact_id);
}

#[tokio::test]
async fn test_record_timestamp_follows_artifact_creation() {
    let h = harness().await;
    let p = pipeline(&h, Arc::new(StubTranscoder::ok()));

    let record = p.ingest(spool_upload(&h, "order.mp4").await).await.unwrap();

    let playlist_mtime: DateTime<Utc> = std::fs::metadata(h.store.playlist_path(record.artifact_id))
        .unwrap()
        .modified()
        .unwrap()
        .into();
    let thumbnail_mtime: DateTime<Utc> =
        std::fs::metadata(h.store.thumbnail_path(record.artifact_id))
            .unwrap()
            .modified()
            .unwrap()
            .into();

    assert!(record.created_at >= playlist_mtime);
    assert!(record.created_at >= thumbnail_mtime);
}

#[tokio::test]
async fn test_caller_supplied_metadata_is_kept() {
    let h = harness().await;
    let p = pipeline(&h, Arc::new(StubTranscoder::ok()));

    let mut upload = spool_upload(&h, "described.mp4").await;
    upload.description = Some("A described video".to_string());
    upload.uploader_id = Some("user-42".to_string());

    let record = p.ingest(upload).await.unwrap();
    assert_eq!(record.description, "A described video");
    assert_eq!(record.uploader_id, "user-42");
}

#[tokio::test]
async fn test_blank_description_falls_back_to_placeholder() {
    let h = harness().await;
    let p = pipeline(&h, Arc::new(StubTranscoder::ok()));

    let mut upload = spool_upload(&h, "blank.mp4").await;
    upload.description = Some("   ".to_string());

    let record = p.ingest(upload).await.unwrap();
    assert_eq!(record.description, "No description");
}

#[tokio::test]
async fn test_short_source_clamps_frame_offset() {
    let h = harness().await;
    let stub = Arc::new(StubTranscoder::with_duration(Some(1.0)));
    let p = pipeline(&h, stub.clone());

    let record = p.ingest(spool_upload(&h, "short.mp4").await).await.unwrap();

    // Nominal offset is 2s; a 1s source must clamp instead of failing.
    assert_eq!(stub.recorded_frame_offset(), Some(1.0));
    assert_eq!(record.description, "No description");
}

#[tokio::test]
async fn test_unknown_duration_uses_configured_offset() {
    let h = harness().await;
    let stub = Arc::new(StubTranscoder::with_duration(None));
    let p = pipeline(&h, stub.clone());

    p.ingest(spool_upload(&h, "unknown.mp4").await).await.unwrap();
    assert_eq!(stub.recorded_frame_offset(), Some(2.0));
}

#[tokio::test]
async fn test_streaming_failure_leaves_no_record_and_keeps_directory() {
    let h = harness().await;
    let p = pipeline(&h, Arc::new(StubTranscoder::with_failure(FailAt::StreamingSet)));

    let upload = spool_upload(&h, "broken.mp4").await;
    let err = p.ingest(upload.clone()).await.unwrap_err();

    match &err {
        AppError::Transcode { detail, .. } => {
            assert!(detail.contains("Invalid data"), "stderr should be carried");
        }
        other => panic!("expected Transcode error, got {:?}", other),
    }

    // No record persisted.
    assert!(h.repo.list_all().await.unwrap().is_empty());

    // The allocated directory is left behind as a deferred orphan, and the
    // raw upload is not cleaned up on failure.
    let dirs = std::fs::read_dir(h.store.root()).unwrap().count();
    assert_eq!(dirs, 1);
    assert!(upload.source_path.exists());
}

#[tokio::test]
async fn test_frame_failure_leaves_no_record() {
    let h = harness().await;
    let p = pipeline(&h, Arc::new(StubTranscoder::with_failure(FailAt::FrameExtraction)));

    let err = p.ingest(spool_upload(&h, "noframe.mp4").await).await.unwrap_err();
    assert!(matches!(err, AppError::Transcode { .. }));
    assert!(h.repo.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_thumbnail_failure_leaves_no_record() {
    let h = harness().await;
    let p = pipeline(&h, Arc::new(StubTranscoder::with_failure(FailAt::BadFrame)));

    let err = p.ingest(spool_upload(&h, "badframe.mp4").await).await.unwrap_err();
    assert!(matches!(err, AppError::ImageProcessing(_)));
    assert!(h.repo.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_persistence_failure_leaves_orphan_artifacts() {
    let h = harness().await;
    let p = pipeline(&h, Arc::new(StubTranscoder::ok()));

    // Make the final stage fail after all artifacts exist.
    sqlx::raw_sql("DROP TABLE media_records")
        .execute(&h.pool)
        .await
        .unwrap();

    let err = p.ingest(spool_upload(&h, "orphan.mp4").await).await.unwrap_err();
    assert!(matches!(err, AppError::Database(_)));

    // Fully-produced artifacts remain on disk with no record.
    let mut dirs = std::fs::read_dir(h.store.root()).unwrap();
    let entry = dirs.next().unwrap().unwrap();
    assert!(entry.path().join("index.m3u8").exists());
    assert!(entry.path().join("thumbnail.jpg").exists());
}

#[tokio::test]
async fn test_concurrent_ingestions_are_independent() {
    let h = harness().await;
    let p = Arc::new(pipeline(&h, Arc::new(StubTranscoder::ok())));

    let mut handles = Vec::new();
    for i in 0..4 {
        let p = p.clone();
        let upload = spool_upload(&h, &format!("clip{}.mp4", i)).await;
        handles.push(tokio::spawn(async move { p.ingest(upload).await }));
    }

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        let record = handle.await.unwrap().unwrap();
        ids.insert(record.artifact_id);
    }

    assert_eq!(ids.len(), 4);
    assert_eq!(h.repo.list_all().await.unwrap().len(), 4);
}
