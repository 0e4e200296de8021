use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::AudioArtifact;

/// Reads text that appears in an image (signs, documents, labels).
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Returns `Ok(None)` when the image contains no readable text.
    async fn detect(&self, image: &[u8]) -> Result<Option<String>, ProviderError>;
}

/// Produces a natural-language caption for an image.
#[async_trait]
pub trait SceneDescriber: Send + Sync {
    fn name(&self) -> &str;

    async fn describe(&self, image: &[u8]) -> Result<String, ProviderError>;
}

/// Converts text to narration audio and persists it under `output_name`.
///
/// Calling twice with the same `output_name` overwrites the earlier file.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &str;

    /// File extension of the audio this synthesizer writes, without the dot.
    fn extension(&self) -> &str;

    async fn synthesize(&self, text: &str, output_name: &str) -> Result<AudioArtifact, ProviderError>;
}
