//! Builds the pipeline's providers from configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use narrator_config::{NarratorConfig, ProvidersConfig, SpeechBackend, VisionBackend};
use narrator_core::{SceneDescriber, SpeechSynthesizer, TextRecognizer};
use narrator_media::ImagePipeline;
use narrator_tts::{create_tts, AudioFormat, FileSpeechSynthesizer, TtsProviderKind};
use narrator_understanding::{
    MockSceneDescriber, MockTextRecognizer, VisionProvider, VisionSceneDescriber, VisionTextRecognizer,
};
use tracing::{debug, info};

pub fn build_pipeline(config: &NarratorConfig) -> Result<ImagePipeline> {
    let providers = &config.providers;
    let recognizer = text_recognizer(providers)?;
    let describer = scene_describer(providers)?;
    let synthesizer = speech_synthesizer(config)?;

    info!(
        ocr = recognizer.name(),
        vision = describer.name(),
        tts = synthesizer.name(),
        "Providers ready"
    );

    Ok(ImagePipeline::new(recognizer, describer, synthesizer)
        .with_provider_timeout(Duration::from_secs(providers.timeout_secs))
        .with_unique_audio_names(config.audio.unique_names))
}

fn text_recognizer(providers: &ProvidersConfig) -> Result<Arc<dyn TextRecognizer>> {
    Ok(match vision_provider(providers.text_recognizer, providers)? {
        Some(provider) => Arc::new(VisionTextRecognizer::new(provider)),
        None => Arc::new(MockTextRecognizer),
    })
}

fn scene_describer(providers: &ProvidersConfig) -> Result<Arc<dyn SceneDescriber>> {
    Ok(match vision_provider(providers.scene_describer, providers)? {
        Some(provider) => Arc::new(VisionSceneDescriber::new(provider)),
        None => Arc::new(MockSceneDescriber),
    })
}

/// `None` selects the mock.
fn vision_provider(backend: VisionBackend, providers: &ProvidersConfig) -> Result<Option<VisionProvider>> {
    let provider = match backend {
        VisionBackend::Mock => return Ok(None),
        VisionBackend::OpenAi => {
            let openai = &providers.openai;
            let key = openai.api_key.clone().context("providers.openai.api_key is not set")?;
            let mut provider = VisionProvider::openai(key);
            if let Some(model) = &openai.vision_model {
                provider = provider.with_model(model.clone());
            }
            if let Some(url) = &openai.base_url {
                provider = provider.with_base_url(url.clone());
            }
            provider
        }
        VisionBackend::Gemini => {
            let gemini = &providers.gemini;
            let key = gemini.api_key.clone().context("providers.gemini.api_key is not set")?;
            let mut provider = VisionProvider::gemini(key);
            if let Some(model) = &gemini.model {
                provider = provider.with_model(model.clone());
            }
            provider
        }
    };
    Ok(Some(provider))
}

fn speech_synthesizer(config: &NarratorConfig) -> Result<Arc<dyn SpeechSynthesizer>> {
    let providers = &config.providers;
    let kind = match providers.speech {
        SpeechBackend::Mock => TtsProviderKind::Mock,
        SpeechBackend::OpenAi => TtsProviderKind::OpenAi {
            api_key: providers.openai.api_key.clone().context("providers.openai.api_key is not set")?,
            model: providers.openai.tts_model.clone(),
            voice: None,
        },
        SpeechBackend::ElevenLabs => TtsProviderKind::ElevenLabs {
            api_key: providers
                .elevenlabs
                .api_key
                .clone()
                .context("providers.elevenlabs.api_key is not set")?,
            voice_id: providers.elevenlabs.voice_id.clone(),
        },
    };

    let format: AudioFormat = config.audio.format.parse().map_err(|e: String| anyhow!(e))?;
    let synthesizer = FileSpeechSynthesizer::new(
        create_tts(kind),
        config.storage.audio_dir.clone(),
        config.storage.audio_url_prefix.trim_end_matches('/').to_string(),
    )
    .with_format(format)
    .with_voice(config.audio.voice.clone())
    .with_speed(config.audio.speed);
    debug!(format = synthesizer.format().extension(), "Speech output format selected");
    Ok(Arc::new(synthesizer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_mocks() {
        let config = NarratorConfig::default();
        assert_eq!(text_recognizer(&config.providers).unwrap().name(), "mock-ocr");
        assert_eq!(scene_describer(&config.providers).unwrap().name(), "mock-vision");
        assert!(build_pipeline(&config).is_ok());
    }

    #[test]
    fn hosted_backends_are_selected_per_role() {
        let mut config = NarratorConfig::default();
        config.providers.text_recognizer = VisionBackend::OpenAi;
        config.providers.scene_describer = VisionBackend::Gemini;
        config.providers.openai.api_key = Some("sk-test".into());
        config.providers.gemini.api_key = Some("g-test".into());

        assert_eq!(text_recognizer(&config.providers).unwrap().name(), "openai-vision");
        assert_eq!(scene_describer(&config.providers).unwrap().name(), "gemini-vision");
    }

    #[test]
    fn missing_key_is_an_error() {
        let mut config = NarratorConfig::default();
        config.providers.speech = SpeechBackend::ElevenLabs;
        let err = build_pipeline(&config).err().unwrap().to_string();
        assert!(err.contains("elevenlabs"));
    }

    #[test]
    fn unknown_audio_format_is_an_error() {
        let mut config = NarratorConfig::default();
        config.audio.format = "ogg".into();
        assert!(speech_synthesizer(&config).is_err());
    }
}
