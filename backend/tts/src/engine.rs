/// TTS provider trait and implementations (OpenAI TTS + ElevenLabs + mock).
use std::str::FromStr;

use async_trait::async_trait;
use bytes::Bytes;
use narrator_core::ProviderError;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::info;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Audio format for TTS output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AudioFormat {
    #[default]
    Mp3,
    Opus,
    Aac,
    Flac,
    Wav,
}

impl AudioFormat {
    /// File extension, also the value OpenAI expects in `response_format`.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
            Self::Aac => "aac",
            Self::Flac => "flac",
            Self::Wav => "wav",
        }
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "opus" => Ok(Self::Opus),
            "aac" => Ok(Self::Aac),
            "flac" => Ok(Self::Flac),
            "wav" => Ok(Self::Wav),
            other => Err(format!("unsupported audio format: {other}")),
        }
    }
}

/// A TTS request.
#[derive(Debug, Clone)]
pub struct TtsRequest {
    pub text: String,
    pub voice: Option<String>,
    pub format: AudioFormat,
    pub speed: f32,
}

/// Returns raw audio bytes.
#[async_trait]
pub trait TtsProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Formats this engine can produce. The first is used when a request's
    /// format is unsupported.
    fn supported_formats(&self) -> &[AudioFormat] {
        &[AudioFormat::Mp3]
    }

    async fn synthesize(&self, req: TtsRequest) -> Result<Bytes, ProviderError>;
}

fn status_error(provider: &str, status: StatusCode, body: String) -> ProviderError {
    let message = format!("{status}: {body}");
    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::quota_exceeded(provider, message),
        s if s.is_client_error() => ProviderError::malformed_input(provider, message),
        _ => ProviderError::unavailable(provider, message),
    }
}

async fn read_audio(provider: &str, resp: Result<reqwest::Response, reqwest::Error>) -> Result<Bytes, ProviderError> {
    let resp = resp.map_err(|e| ProviderError::unavailable(provider, e.to_string()))?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(status_error(provider, status, body));
    }
    resp.bytes()
        .await
        .map_err(|e| ProviderError::unavailable(provider, format!("failed to read audio body: {e}")))
}

// ---------------------------------------------------------------------------
// OpenAI TTS
// ---------------------------------------------------------------------------

pub struct OpenAiTts {
    api_key: String,
    model: String,
    default_voice: String,
    base_url: String,
    client: Client,
}

impl OpenAiTts {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: "tts-1".to_string(),
            default_voice: "nova".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            client: Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.default_voice = voice.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Serialize)]
struct OpenAiTtsBody {
    model: String,
    input: String,
    voice: String,
    response_format: String,
    speed: f32,
}

#[async_trait]
impl TtsProvider for OpenAiTts {
    fn name(&self) -> &str {
        "openai-tts"
    }

    fn supported_formats(&self) -> &[AudioFormat] {
        &[AudioFormat::Mp3, AudioFormat::Opus, AudioFormat::Aac, AudioFormat::Flac, AudioFormat::Wav]
    }

    async fn synthesize(&self, req: TtsRequest) -> Result<Bytes, ProviderError> {
        let body = OpenAiTtsBody {
            model: self.model.clone(),
            input: req.text,
            voice: req.voice.unwrap_or_else(|| self.default_voice.clone()),
            response_format: req.format.extension().to_string(),
            speed: req.speed,
        };
        info!("[TTS/OpenAI] Synthesizing with model={}", body.model);
        let resp = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await;
        read_audio(self.name(), resp).await
    }
}

// ---------------------------------------------------------------------------
// ElevenLabs TTS
// ---------------------------------------------------------------------------

pub struct ElevenLabsTts {
    api_key: String,
    default_voice_id: String,
    client: Client,
}

impl ElevenLabsTts {
    pub fn new(api_key: String, voice_id: Option<String>) -> Self {
        Self {
            api_key,
            default_voice_id: voice_id.unwrap_or_else(|| "21m00Tcm4TlvDq8ikWAM".to_string()), // Rachel
            client: Client::new(),
        }
    }
}

#[derive(Serialize)]
struct ElevenLabsBody {
    text: String,
    model_id: String,
    voice_settings: ElevenLabsVoiceSettings,
}

#[derive(Serialize)]
struct ElevenLabsVoiceSettings {
    stability: f32,
    similarity_boost: f32,
    speed: f32,
}

#[async_trait]
impl TtsProvider for ElevenLabsTts {
    fn name(&self) -> &str {
        "elevenlabs-tts"
    }

    async fn synthesize(&self, req: TtsRequest) -> Result<Bytes, ProviderError> {
        let voice_id = req.voice.as_deref().unwrap_or(&self.default_voice_id);
        let url = format!(
            "https://api.elevenlabs.io/v1/text-to-speech/{}/stream",
            voice_id
        );
        let body = ElevenLabsBody {
            text: req.text,
            model_id: "eleven_monolingual_v1".to_string(),
            voice_settings: ElevenLabsVoiceSettings {
                stability: 0.5,
                similarity_boost: 0.75,
                speed: req.speed,
            },
        };
        info!("[TTS/ElevenLabs] Synthesizing voice_id={}", voice_id);
        let resp = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await;
        read_audio(self.name(), resp).await
    }
}

// ---------------------------------------------------------------------------
// Mock
// ---------------------------------------------------------------------------

/// Placeholder engine that emits a fixed byte string instead of speech.
pub struct MockTts;

impl MockTts {
    pub const PLACEHOLDER: &'static [u8] = b"dummy_audio_data";
}

#[async_trait]
impl TtsProvider for MockTts {
    fn name(&self) -> &str {
        "mock-tts"
    }

    async fn synthesize(&self, _req: TtsRequest) -> Result<Bytes, ProviderError> {
        Ok(Bytes::from_static(Self::PLACEHOLDER))
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

pub enum TtsProviderKind {
    Mock,
    OpenAi { api_key: String, model: Option<String>, voice: Option<String> },
    ElevenLabs { api_key: String, voice_id: Option<String> },
}

pub fn create_tts(kind: TtsProviderKind) -> Box<dyn TtsProvider> {
    match kind {
        TtsProviderKind::Mock => Box::new(MockTts),
        TtsProviderKind::OpenAi { api_key, model, voice } => {
            let mut tts = OpenAiTts::new(api_key);
            if let Some(model) = model {
                tts = tts.with_model(model);
            }
            if let Some(voice) = voice {
                tts = tts.with_voice(voice);
            }
            Box::new(tts)
        }
        TtsProviderKind::ElevenLabs { api_key, voice_id } => {
            Box::new(ElevenLabsTts::new(api_key, voice_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formats_case_insensitively() {
        assert_eq!("MP3".parse::<AudioFormat>().unwrap(), AudioFormat::Mp3);
        assert_eq!("opus".parse::<AudioFormat>().unwrap(), AudioFormat::Opus);
        assert!("ogg".parse::<AudioFormat>().is_err());
    }

    #[test]
    fn quota_and_client_errors_are_distinguished() {
        assert!(matches!(
            status_error("t", StatusCode::TOO_MANY_REQUESTS, String::new()),
            ProviderError::QuotaExceeded { .. }
        ));
        assert!(matches!(
            status_error("t", StatusCode::UNPROCESSABLE_ENTITY, String::new()),
            ProviderError::MalformedInput { .. }
        ));
        assert!(matches!(
            status_error("t", StatusCode::SERVICE_UNAVAILABLE, String::new()),
            ProviderError::Unavailable { .. }
        ));
    }

    #[tokio::test]
    async fn mock_returns_placeholder_bytes() {
        let tts = create_tts(TtsProviderKind::Mock);
        let req = TtsRequest { text: "hi".into(), voice: None, format: AudioFormat::Mp3, speed: 1.0 };
        let bytes = tts.synthesize(req).await.unwrap();
        assert_eq!(&bytes[..], MockTts::PLACEHOLDER);
        assert_eq!(tts.supported_formats(), &[AudioFormat::Mp3]);
    }
}
