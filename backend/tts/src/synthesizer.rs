//! Speech synthesizer that persists narration audio to a directory served
//! statically by the gateway.

use std::path::PathBuf;

use async_trait::async_trait;
use narrator_core::{AudioArtifact, ProviderError, SpeechSynthesizer};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::engine::{AudioFormat, TtsProvider, TtsRequest};

/// Writes audio produced by a [`TtsProvider`] into `output_dir`.
///
/// Files are written to a temporary sibling and renamed into place, so a
/// repeated call with the same output name replaces the previous file whole.
pub struct FileSpeechSynthesizer {
    engine: Box<dyn TtsProvider>,
    output_dir: PathBuf,
    url_prefix: String,
    format: AudioFormat,
    voice: Option<String>,
    speed: f32,
}

impl FileSpeechSynthesizer {
    pub fn new(engine: Box<dyn TtsProvider>, output_dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let format = engine.supported_formats().first().copied().unwrap_or_default();
        Self {
            engine,
            output_dir: output_dir.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
            format,
            voice: None,
            speed: 1.0,
        }
    }

    /// Request a format; falls back to the engine's default if unsupported.
    pub fn with_format(mut self, format: AudioFormat) -> Self {
        if self.engine.supported_formats().contains(&format) {
            self.format = format;
        } else {
            warn!(
                engine = self.engine.name(),
                requested = format.extension(),
                using = self.format.extension(),
                "Audio format not supported by engine"
            );
        }
        self
    }

    pub fn with_voice(mut self, voice: Option<String>) -> Self {
        self.voice = voice;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    fn storage_error(&self, e: std::io::Error) -> ProviderError {
        ProviderError::storage(self.engine.name(), e)
    }
}

#[async_trait]
impl SpeechSynthesizer for FileSpeechSynthesizer {
    fn name(&self) -> &str {
        self.engine.name()
    }

    fn extension(&self) -> &str {
        self.format.extension()
    }

    async fn synthesize(&self, text: &str, output_name: &str) -> Result<AudioArtifact, ProviderError> {
        if output_name.is_empty()
            || output_name.contains(['/', '\\'])
            || output_name.starts_with('.')
        {
            return Err(ProviderError::malformed_input(
                self.engine.name(),
                format!("invalid output name: {output_name:?}"),
            ));
        }

        let audio = self
            .engine
            .synthesize(TtsRequest {
                text: text.to_string(),
                voice: self.voice.clone(),
                format: self.format,
                speed: self.speed,
            })
            .await?;

        fs::create_dir_all(&self.output_dir).await.map_err(|e| self.storage_error(e))?;

        let path = self.output_dir.join(output_name);
        let tmp_path = self.output_dir.join(format!(".{output_name}.{}.tmp", uuid::Uuid::new_v4().simple()));
        fs::write(&tmp_path, &audio).await.map_err(|e| self.storage_error(e))?;
        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(self.storage_error(e));
        }
        debug!(path = %path.display(), bytes = audio.len(), "Wrote narration audio");

        let url = format!("{}/{}", self.url_prefix, output_name);
        info!(engine = self.engine.name(), url = %url, "Synthesized narration");
        Ok(AudioArtifact { filename: output_name.to_string(), path, url })
    }
}
