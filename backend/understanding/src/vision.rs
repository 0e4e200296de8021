//! Vision understanding: caption images with a vision LLM.
//!
//! The same [`VisionClient`] backs both scene description here and text
//! recognition in [`crate::ocr`]; only the prompt differs.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use narrator_core::{ProviderError, SceneDescriber};
use reqwest::{Client, StatusCode};
use tracing::info;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Prompt used when asking for a spoken scene description.
pub const DESCRIBE_PROMPT: &str = "Describe this image in one or two short sentences for a listener \
who cannot see it. Mention the main subject first.";

/// Supported vision providers.
#[derive(Debug, Clone)]
pub enum VisionProvider {
    OpenAI { api_key: String, model: String, base_url: String },
    Gemini { api_key: String, model: String, base_url: String },
}

impl VisionProvider {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::OpenAI {
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self::Gemini {
            api_key: api_key.into(),
            model: "gemini-2.0-flash".to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, new_model: impl Into<String>) -> Self {
        match &mut self {
            Self::OpenAI { model, .. } | Self::Gemini { model, .. } => *model = new_model.into(),
        }
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        match &mut self {
            Self::OpenAI { base_url, .. } | Self::Gemini { base_url, .. } => {
                *base_url = url.into().trim_end_matches('/').to_string()
            }
        }
        self
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAI { .. } => "openai-vision",
            Self::Gemini { .. } => "gemini-vision",
        }
    }
}

/// HTTP client for a vision LLM.
#[derive(Debug, Clone)]
pub struct VisionClient {
    provider: VisionProvider,
    http: Client,
}

impl VisionClient {
    pub fn new(provider: VisionProvider) -> Self {
        Self { provider, http: Client::new() }
    }

    pub fn name(&self) -> &'static str {
        self.provider.name()
    }

    /// Send an image and a prompt, returning the model's text reply.
    pub async fn ask(&self, image: &[u8], prompt: &str) -> Result<String, ProviderError> {
        if image.is_empty() {
            return Err(ProviderError::malformed_input(self.name(), "image is empty"));
        }
        let mime_type = sniff_image_mime(image);
        let b64 = STANDARD.encode(image);
        match &self.provider {
            VisionProvider::OpenAI { api_key, model, base_url } => {
                self.ask_openai(api_key, model, base_url, &b64, mime_type, prompt).await
            }
            VisionProvider::Gemini { api_key, model, base_url } => {
                self.ask_gemini(api_key, model, base_url, &b64, mime_type, prompt).await
            }
        }
    }

    async fn ask_openai(
        &self, api_key: &str, model: &str, base_url: &str, b64: &str, mime_type: &str, prompt: &str,
    ) -> Result<String, ProviderError> {
        info!(model, "[Vision] Querying OpenAI");
        let body = serde_json::json!({
            "model": model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    { "type": "image_url",
                      "image_url": { "url": format!("data:{};base64,{}", mime_type, b64) } }
                ]
            }],
            "max_tokens": 512
        });
        let resp = self
            .http
            .post(format!("{base_url}/chat/completions"))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::unavailable(self.name(), e.to_string()))?;
        let json = read_json(self.name(), resp).await?;
        Ok(openai_content(&json))
    }

    async fn ask_gemini(
        &self, api_key: &str, model: &str, base_url: &str, b64: &str, mime_type: &str, prompt: &str,
    ) -> Result<String, ProviderError> {
        info!(model, "[Vision] Querying Gemini");
        let url = format!("{base_url}/models/{model}:generateContent?key={api_key}");
        let body = serde_json::json!({
            "contents": [{ "parts": [
                { "text": prompt },
                { "inlineData": { "mimeType": mime_type, "data": b64 } }
            ]}]
        });
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::unavailable(self.name(), e.without_url().to_string()))?;
        let json = read_json(self.name(), resp).await?;
        Ok(gemini_content(&json))
    }
}

async fn read_json(provider: &str, resp: reqwest::Response) -> Result<serde_json::Value, ProviderError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(status_error(provider, status, body));
    }
    resp.json()
        .await
        .map_err(|e| ProviderError::unavailable(provider, format!("invalid response body: {e}")))
}

/// Map a non-success HTTP status to a provider error kind.
pub fn status_error(provider: &str, status: StatusCode, body: String) -> ProviderError {
    let message = format!("{status}: {body}");
    if status == StatusCode::TOO_MANY_REQUESTS {
        ProviderError::quota_exceeded(provider, message)
    } else if status.is_client_error() {
        ProviderError::malformed_input(provider, message)
    } else {
        ProviderError::unavailable(provider, message)
    }
}

fn openai_content(json: &serde_json::Value) -> String {
    json["choices"][0]["message"]["content"].as_str().unwrap_or("").trim().to_string()
}

fn gemini_content(json: &serde_json::Value) -> String {
    json["candidates"][0]["content"]["parts"][0]["text"].as_str().unwrap_or("").trim().to_string()
}

/// Best-effort MIME type from magic bytes, defaulting to JPEG.
pub fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'B', b'M', ..] => "image/bmp",
        _ => "image/jpeg",
    }
}

/// Scene describer backed by a vision LLM.
pub struct VisionSceneDescriber {
    client: VisionClient,
}

impl VisionSceneDescriber {
    pub fn new(provider: VisionProvider) -> Self {
        Self { client: VisionClient::new(provider) }
    }
}

#[async_trait]
impl SceneDescriber for VisionSceneDescriber {
    fn name(&self) -> &str {
        self.client.name()
    }

    async fn describe(&self, image: &[u8]) -> Result<String, ProviderError> {
        let caption = self.client.ask(image, DESCRIBE_PROMPT).await?;
        if caption.is_empty() {
            return Err(ProviderError::unavailable(self.name(), "model returned an empty description"));
        }
        Ok(caption)
    }
}

/// Size-bucketed captions for running without a vision backend.
pub struct MockSceneDescriber;

impl MockSceneDescriber {
    pub const SMALL_IMAGE_BYTES: usize = 10_000;
    pub const MEDIUM_IMAGE_BYTES: usize = 50_000;

    pub const SMALL_CAPTION: &'static str =
        "A small object, possibly a pen or a remote control, held in a hand.";
    pub const MEDIUM_CAPTION: &'static str =
        "A person standing in front of a building, possibly an office.";
    pub const LARGE_CAPTION: &'static str =
        "A panoramic view of a landscape with trees and mountains under a blue sky.";
}

#[async_trait]
impl SceneDescriber for MockSceneDescriber {
    fn name(&self) -> &str {
        "mock-vision"
    }

    async fn describe(&self, image: &[u8]) -> Result<String, ProviderError> {
        let caption = if image.len() < Self::SMALL_IMAGE_BYTES {
            Self::SMALL_CAPTION
        } else if image.len() < Self::MEDIUM_IMAGE_BYTES {
            Self::MEDIUM_CAPTION
        } else {
            Self::LARGE_CAPTION
        };
        Ok(caption.to_string())
    }
}
