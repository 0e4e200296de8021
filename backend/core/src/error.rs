use std::time::Duration;

use thiserror::Error;

/// Failure reported by a capability provider (text recognition, scene
/// description, or speech synthesis).
///
/// Any of these is fatal for the request that triggered it.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} unavailable: {message}")]
    Unavailable { provider: String, message: String },

    #[error("{provider} rejected input: {message}")]
    MalformedInput { provider: String, message: String },

    #[error("{provider} quota exceeded: {message}")]
    QuotaExceeded { provider: String, message: String },

    #[error("{provider} timed out after {}s", timeout.as_secs_f32())]
    Timeout { provider: String, timeout: Duration },

    #[error("{provider} failed to persist output: {source}")]
    Storage {
        provider: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProviderError {
    pub fn unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable { provider: provider.into(), message: message.into() }
    }

    pub fn malformed_input(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedInput { provider: provider.into(), message: message.into() }
    }

    pub fn quota_exceeded(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QuotaExceeded { provider: provider.into(), message: message.into() }
    }

    pub fn timeout(provider: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout { provider: provider.into(), timeout }
    }

    pub fn storage(provider: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage { provider: provider.into(), source }
    }

    /// Name of the provider that failed.
    pub fn provider(&self) -> &str {
        match self {
            Self::Unavailable { provider, .. }
            | Self::MalformedInput { provider, .. }
            | Self::QuotaExceeded { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::Storage { provider, .. } => provider,
        }
    }
}

/// Upload rejected before the pipeline is invoked.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No image part in the request")]
    MissingImage,

    #[error("No selected image file")]
    EmptyFilename,

    #[error("Image filename '{0}' contains no usable characters")]
    UnusableFilename(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_name_is_reported_for_every_kind() {
        let errors = [
            ProviderError::unavailable("ocr", "down"),
            ProviderError::malformed_input("ocr", "bad bytes"),
            ProviderError::quota_exceeded("ocr", "429"),
            ProviderError::timeout("ocr", Duration::from_secs(3)),
            ProviderError::storage("ocr", std::io::Error::other("disk full")),
        ];
        for err in errors {
            assert_eq!(err.provider(), "ocr");
        }
    }

    #[test]
    fn timeout_message_mentions_duration() {
        let err = ProviderError::timeout("tts", Duration::from_secs(30));
        assert_eq!(err.to_string(), "tts timed out after 30s");
    }
}
