//! Gateway error type.
//!
//! Handlers return `Result<T, ApiError>`; every error becomes a JSON body of
//! the form `{"error": "..."}` with a matching status code. Provider and I/O
//! details are logged but not sent to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use narrator_core::{ProviderError, ValidationError};
use narrator_media::StagingError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("malformed upload: {0}")]
    BadUpload(String),

    #[error("upload exceeds the size limit")]
    PayloadTooLarge,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StagingError> for ApiError {
    fn from(e: StagingError) -> Self {
        match e {
            StagingError::Validation(v) => Self::Validation(v),
            StagingError::Io { .. } => Self::Internal(e.to_string()),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadUpload(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Provider(e) => match e {
                ProviderError::Unavailable { .. } | ProviderError::QuotaExceeded { .. } => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                ProviderError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                ProviderError::MalformedInput { .. } | ProviderError::Storage { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::BadUpload(m) => m.clone(),
            Self::PayloadTooLarge => "Image exceeds the upload size limit".to_owned(),
            Self::Provider(e) => match e {
                ProviderError::Unavailable { .. } => "Image analysis service unavailable".to_owned(),
                ProviderError::QuotaExceeded { .. } => "Image analysis quota exceeded; try again later".to_owned(),
                ProviderError::Timeout { .. } => "Image analysis timed out".to_owned(),
                ProviderError::MalformedInput { .. } => "Image could not be processed".to_owned(),
                ProviderError::Storage { .. } => "internal server error".to_owned(),
            },
            Self::Internal(_) => "internal server error".to_owned(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(error = %self, "Request rejected");
        }
        (status, Json(json!({ "error": self.client_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn validation_errors_are_client_errors() {
        let err = ApiError::from(ValidationError::EmptyFilename);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "No selected image file");
    }

    #[test]
    fn provider_kinds_map_to_server_statuses() {
        let cases = [
            (ProviderError::unavailable("v", "x"), StatusCode::SERVICE_UNAVAILABLE),
            (ProviderError::quota_exceeded("v", "x"), StatusCode::SERVICE_UNAVAILABLE),
            (ProviderError::timeout("v", Duration::from_secs(1)), StatusCode::GATEWAY_TIMEOUT),
            (ProviderError::malformed_input("v", "x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn staging_io_error_hides_path() {
        let err = ApiError::from(StagingError::Io {
            path: "/srv/uploads/secret.png".into(),
            source: std::io::Error::other("disk full"),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.client_message().contains("/srv"));
    }
}
