use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use vodstore_core::models::{CleanupResult, IntegrityReport};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/check-integrity",
    tag = "integrity",
    responses(
        (status = 200, description = "Integrity report", body = IntegrityReport),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "check_integrity"))]
pub async fn check_integrity(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, HttpAppError> {
    let report = state
        .reconciler
        .audit()
        .await
        .map_err(HttpAppError::from)?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CleanupQuery {
    /// Destructive cleanup requires `confirm=true`; anything else is a dry
    /// run returning the candidate list.
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CleanupResponse {
    pub message: String,
    #[serde(flatten)]
    pub result: CleanupResult,
}

#[utoipa::path(
    delete,
    path = "/cleanup-orphaned",
    tag = "integrity",
    params(CleanupQuery),
    responses(
        (status = 200, description = "Cleanup result (dry run unless confirmed)", body = CleanupResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "cleanup_orphaned", confirm = query.confirm))]
pub async fn cleanup_orphaned(
    State(state): State<AppState>,
    Query(query): Query<CleanupQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let result = state
        .reconciler
        .cleanup(query.confirm)
        .await
        .map_err(HttpAppError::from)?;

    let message = if result.dry_run {
        format!(
            "{} orphaned record(s) would be deleted; re-run with confirm=true to delete",
            result.records.len()
        )
    } else {
        format!("Deleted {} orphaned record(s)", result.records.len())
    };

    Ok(Json(CleanupResponse { message, result }))
}
