//! Optical Character Recognition (OCR)
//!
//! Reads text that appears in an uploaded image. Finding no text is a normal
//! outcome and is reported as `None`, never as an error.

use async_trait::async_trait;
use narrator_core::{ProviderError, TextRecognizer};
use tracing::{debug, info};

use crate::vision::{VisionClient, VisionProvider};

/// Reply the OCR prompt asks the model to give when nothing is legible.
pub const NO_TEXT_SENTINEL: &str = "NO_TEXT";

pub const OCR_PROMPT: &str = "Transcribe all legible text in this image exactly as written, \
preserving line order. Reply with only the text. If the image contains no legible text, \
reply with exactly NO_TEXT.";

/// Text recognizer backed by a vision LLM.
pub struct VisionTextRecognizer {
    client: VisionClient,
}

impl VisionTextRecognizer {
    pub fn new(provider: VisionProvider) -> Self {
        Self { client: VisionClient::new(provider) }
    }
}

#[async_trait]
impl TextRecognizer for VisionTextRecognizer {
    fn name(&self) -> &str {
        self.client.name()
    }

    async fn detect(&self, image: &[u8]) -> Result<Option<String>, ProviderError> {
        info!("Running OCR detection on {} byte image", image.len());
        let reply = self.client.ask(image, OCR_PROMPT).await?;
        Ok(interpret_reply(&reply))
    }
}

/// Collapse a model reply to `None` when it signals absence of text.
pub fn interpret_reply(reply: &str) -> Option<String> {
    let text = reply.trim();
    if text.is_empty() || text.trim_matches(|c: char| !c.is_alphanumeric() && c != '_') == NO_TEXT_SENTINEL {
        debug!("OCR found no text");
        return None;
    }
    Some(text.to_string())
}

/// Parity-based recognizer for running without an OCR backend.
///
/// Reports text for even-length inputs and none for odd-length ones.
pub struct MockTextRecognizer;

impl MockTextRecognizer {
    pub const MOCK_TEXT: &'static str =
        "This is some mock text detected in the image. It could be a street sign or a document.";
}

#[async_trait]
impl TextRecognizer for MockTextRecognizer {
    fn name(&self) -> &str {
        "mock-ocr"
    }

    async fn detect(&self, image: &[u8]) -> Result<Option<String>, ProviderError> {
        if image.len() % 2 == 0 {
            Ok(Some(Self::MOCK_TEXT.to_string()))
        } else {
            Ok(None)
        }
    }
}
