//! Upload page served at `/`.

use anyhow::{Context, Result};
use axum::{extract::State, response::Html};
use std::path::Path;
use std::sync::Arc;

use crate::server::GatewayState;

/// Built-in page used when no custom index file is configured.
pub const DEFAULT_INDEX_HTML: &str = include_str!("../assets/index.html");

/// Load the configured index page, or the built-in one.
pub async fn load_index_page(path: Option<&Path>) -> Result<Arc<str>> {
    match path {
        Some(path) => {
            let html = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read index page: {}", path.display()))?;
            Ok(Arc::from(html))
        }
        None => Ok(Arc::from(DEFAULT_INDEX_HTML)),
    }
}

pub async fn index(State(state): State<GatewayState>) -> Html<String> {
    Html(state.index_html.to_string())
}
