//! Main HTTP server.
//!
//! Routes:
//!   GET  /                      upload page
//!   POST /process_image         describe and narrate an uploaded image
//!   GET  /api/health            liveness report
//!   GET  <audio prefix>/:file   generated narration audio

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use narrator_media::{media_router, ImagePipeline, UploadStager};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::{health_api, index_page, process_image};

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub pipeline: Arc<ImagePipeline>,
    pub stager: UploadStager,
    pub index_html: Arc<str>,
    pub started_at: DateTime<Utc>,
}

impl GatewayState {
    pub fn new(pipeline: ImagePipeline, stager: UploadStager, index_html: Arc<str>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            stager,
            index_html,
            started_at: Utc::now(),
        }
    }
}

/// Router-level settings that do not belong in shared state.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub max_upload_bytes: usize,
    pub audio_dir: PathBuf,
    pub audio_url_prefix: String,
}

pub fn build_router(state: GatewayState, settings: RouterSettings) -> Router {
    let prefix = settings.audio_url_prefix.trim_end_matches('/');
    Router::new()
        .route("/", get(index_page::index))
        .route(
            "/process_image",
            post(process_image::process_image).layer(DefaultBodyLimit::max(settings.max_upload_bytes)),
        )
        .route("/api/health", get(health_api::get_health))
        .with_state(state)
        .nest(prefix, media_router(settings.audio_dir))
        .layer(TraceLayer::new_for_http())
}

/// Serve `router` on `addr` until Ctrl-C.
#[instrument(skip(router))]
pub async fn start_server(addr: SocketAddr, router: Router) -> Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    info!("Narrator listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
