//! `POST /process_image`: describe an uploaded image and narrate it.
//!
//! Expects `multipart/form-data` with the image in the `image` field.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use narrator_core::{PipelineResult, ValidationError};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

pub async fn process_image(
    State(state): State<GatewayState>,
    mut multipart: Multipart,
) -> Result<Json<PipelineResult>, ApiError> {
    let (filename, bytes) = read_image_field(&mut multipart).await?;
    debug!(filename = %filename, size_bytes = bytes.len(), "Received image upload");

    let payload = state.stager.stage(&filename, bytes).await?;
    let result = state.pipeline.process(payload).await?;

    info!(
        description_len = result.description.len(),
        degenerate = result.is_degenerate(),
        audio = result.audio_url.as_deref().unwrap_or("none"),
        "Image processed"
    );
    Ok(Json(result))
}

/// Find the `image` file field. Other fields are skipped.
async fn read_image_field(multipart: &mut Multipart) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_owned) else {
            return Err(ValidationError::MissingImage.into());
        };
        if filename.trim().is_empty() {
            return Err(ValidationError::EmptyFilename.into());
        }
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok((filename, bytes));
    }
    Err(ValidationError::MissingImage.into())
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadUpload(e.body_text())
    }
}
