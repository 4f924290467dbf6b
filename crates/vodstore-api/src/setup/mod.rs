//! Application assembly: state construction, routes, and the server loop.

pub mod routes;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;

use vodstore_core::Config;
use vodstore_storage::ArtifactStore;

use crate::state::AppState;

/// Build the application state and router from configuration: connect the
/// record store, open the artifact root, and verify the transcoder binary
/// is runnable before accepting uploads.
pub async fn initialize_app(config: Config) -> Result<(AppState, Router), anyhow::Error> {
    let pool = vodstore_db::connect(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to record store")?;

    let artifacts = ArtifactStore::new(config.videos_dir())
        .await
        .context("Failed to open artifact store")?;

    let transcoder = AppState::ffmpeg_transcoder(&config);
    transcoder
        .verify_available()
        .await
        .context("FFmpeg is not installed or not accessible")?;
    tracing::info!(ffmpeg = %config.ffmpeg_path, "FFmpeg is installed and accessible");

    let state = AppState::new(config, pool, artifacts, Arc::new(transcoder));
    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}

/// Bind and serve until the process is stopped.
pub async fn start_server(config: &Config, router: Router) -> Result<(), anyhow::Error> {
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, router)
        .await
        .context("Server error")?;

    Ok(())
}
