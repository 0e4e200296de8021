//! Static server for generated narration audio.
//!
//! Mount at the configured audio URL prefix (`/static/audio` by default):
//!   GET /static/audio/:filename  serve a generated audio file

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::{path::PathBuf, sync::Arc};
use tokio::fs;
use tracing::{debug, warn};

use crate::mime_detect::{detect_mime_type, is_audio, is_inline_safe};

/// State shared by media server routes.
#[derive(Clone)]
pub struct MediaServerState {
    pub media_dir: Arc<PathBuf>,
}

/// Build the audio server router rooted at `media_dir`.
pub fn media_router(media_dir: PathBuf) -> Router {
    let state = MediaServerState {
        media_dir: Arc::new(media_dir),
    };
    Router::new()
        .route("/:filename", get(serve_media))
        .with_state(state)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// GET /:filename: read a file from the audio directory.
async fn serve_media(
    Path(filename): Path<String>,
    State(state): State<MediaServerState>,
) -> Response {
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') || filename.starts_with('.') {
        warn!(filename = %filename, "Rejected suspicious media path");
        return error(StatusCode::BAD_REQUEST, "Invalid filename");
    }

    let path = state.media_dir.join(&filename);
    let mime = detect_mime_type(&path);
    if !is_audio(mime) {
        return error(StatusCode::NOT_FOUND, "Media file not found");
    }
    debug!(path = %path.display(), "Serving media file");

    match fs::read(&path).await {
        Ok(bytes) => {
            let disposition = if is_inline_safe(mime) {
                format!("inline; filename=\"{filename}\"")
            } else {
                format!("attachment; filename=\"{filename}\"")
            };
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                    // Names are reused across uploads of the same file.
                    (header::CACHE_CONTROL, "no-cache".to_string()),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error(StatusCode::NOT_FOUND, "Media file not found")
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read media file");
            error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read media")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn audio_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("narrator-media-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn serves_existing_audio_with_mime_type() {
        let dir = audio_dir();
        std::fs::write(dir.join("output_cat.mp3"), b"dummy_audio_data").unwrap();

        let resp = media_router(dir)
            .oneshot(Request::get("/output_cat.mp3").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "audio/mpeg");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"dummy_audio_data");
    }

    #[tokio::test]
    async fn missing_file_is_404() {
        let resp = media_router(audio_dir())
            .oneshot(Request::get("/output_none.mp3").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn hidden_and_traversal_names_are_rejected() {
        for uri in ["/..secret", "/.output_x.mp3.tmp"] {
            let resp = media_router(audio_dir())
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn only_audio_files_are_served() {
        let dir = audio_dir();
        std::fs::write(dir.join("notes.txt"), b"not audio").unwrap();

        let resp = media_router(dir)
            .oneshot(Request::get("/notes.txt").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
