//! Image-to-narration pipeline.
//!
//! Runs text recognition first and falls back to scene description only when
//! no text is found. The resulting description is narrated by the speech
//! synthesizer. The staged upload is released on every exit path.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use narrator_core::{
    derive_audio_name, DescriptionResult, ImagePayload, PipelineResult, ProviderError, SceneDescriber,
    SpeechSynthesizer, TextRecognizer,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Default upper bound for a single provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ImagePipeline {
    recognizer: Arc<dyn TextRecognizer>,
    describer: Arc<dyn SceneDescriber>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    provider_timeout: Duration,
    unique_audio_names: bool,
}

impl ImagePipeline {
    pub fn new(
        recognizer: Arc<dyn TextRecognizer>,
        describer: Arc<dyn SceneDescriber>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            recognizer,
            describer,
            synthesizer,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            unique_audio_names: false,
        }
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    /// Append a random suffix to audio names so same-named uploads do not
    /// overwrite each other's narration.
    pub fn with_unique_audio_names(mut self, unique: bool) -> Self {
        self.unique_audio_names = unique;
        self
    }

    /// Describe and narrate an image. Consumes the payload and removes its
    /// staged file before returning, whether or not a provider failed.
    #[instrument(
        skip_all,
        fields(run_id = %Uuid::new_v4(), image = %image.filename(), bytes = image.len())
    )]
    pub async fn process(&self, image: ImagePayload) -> Result<PipelineResult, ProviderError> {
        let outcome = self.run(&image).await;
        image.release().await;
        if let Err(e) = &outcome {
            warn!(provider = e.provider(), error = %e, "Pipeline failed");
        }
        outcome
    }

    async fn run(&self, image: &ImagePayload) -> Result<PipelineResult, ProviderError> {
        let description = self.describe(image.bytes()).await?;

        if description.is_empty() {
            warn!("No description produced; skipping speech synthesis");
            return Ok(PipelineResult::empty());
        }
        info!(source = %description.source, "Image described");

        let suffix = self
            .unique_audio_names
            .then(|| Uuid::new_v4().simple().to_string()[..8].to_string());
        let output_name = derive_audio_name(image.filename(), self.synthesizer.extension(), suffix.as_deref());

        let artifact = self
            .call(
                self.synthesizer.name(),
                self.synthesizer.synthesize(&description.text, &output_name),
            )
            .await?;

        Ok(PipelineResult {
            description: description.text,
            audio_url: Some(artifact.url),
            source: Some(description.source),
        })
    }

    /// Any non-empty recognized text wins, whitespace included; the describer
    /// runs only when the recognizer finds nothing.
    async fn describe(&self, bytes: &[u8]) -> Result<DescriptionResult, ProviderError> {
        let detected = self.call(self.recognizer.name(), self.recognizer.detect(bytes)).await?;
        if let Some(text) = detected.filter(|t| !t.is_empty()) {
            return Ok(DescriptionResult::text_detected(&text));
        }
        let caption = self.call(self.describer.name(), self.describer.describe(bytes)).await?;
        Ok(DescriptionResult::scene(caption))
    }

    async fn call<T>(
        &self,
        provider: &str,
        fut: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, ProviderError> {
        tokio::time::timeout(self.provider_timeout, fut)
            .await
            .map_err(|_| ProviderError::timeout(provider, self.provider_timeout))?
    }
}
