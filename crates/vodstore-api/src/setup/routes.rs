//! Route configuration and middleware.

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::handlers::{integrity, public_file, video_get, video_upload};
use crate::state::AppState;

/// Room for multipart boundaries and text fields on top of the video itself.
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

/// Upper bound on in-flight requests; transcode concurrency is bounded
/// separately by the pipeline's semaphore.
const HTTP_CONCURRENCY_LIMIT: usize = 1024;

pub fn setup_routes(state: AppState) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(&state)?;
    let body_limit = state.config.max_video_size_bytes + BODY_LIMIT_SLACK;

    let router = Router::new()
        .route("/health", get(health))
        .route("/upload", post(video_upload::upload_video))
        .route("/videos", get(video_get::list_videos))
        .route("/videos/{id}", get(video_get::get_video))
        .route("/check-integrity", get(integrity::check_integrity))
        .route("/cleanup-orphaned", delete(integrity::cleanup_orphaned))
        .route(
            "/uploads/videos/{id}/{file_name}",
            get(public_file::serve_artifact),
        )
        .route("/api/openapi.json", get(openapi))
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

fn setup_cors(state: &AppState) -> Result<CorsLayer, anyhow::Error> {
    let origins = &state.config.cors_origins;

    let cors = if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers(Any)
    } else {
        let parsed: Result<Vec<HeaderValue>, _> =
            origins.iter().map(|o| o.parse::<HeaderValue>()).collect();
        let parsed = parsed.map_err(|e| anyhow::anyhow!("invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers(Any)
    };

    Ok(cors)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn openapi() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
