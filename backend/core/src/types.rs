use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// An uploaded image handed to the pipeline.
///
/// Owns the staged file backing the upload. The file is removed by
/// [`ImagePayload::release`], or on drop if the payload is discarded first.
#[derive(Debug)]
pub struct ImagePayload {
    filename: String,
    bytes: Bytes,
    staged_path: Option<PathBuf>,
}

impl ImagePayload {
    /// `filename` must already be sanitized.
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>, staged_path: PathBuf) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
            staged_path: Some(staged_path),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn staged_path(&self) -> Option<&Path> {
        self.staged_path.as_deref()
    }

    /// Remove the staged file. A file that is already gone counts as released.
    pub async fn release(mut self) {
        if let Some(path) = self.staged_path.take() {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!(path = %path.display(), "Released staged image"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove staged image"),
            }
        }
    }
}

impl Drop for ImagePayload {
    fn drop(&mut self) {
        if let Some(path) = self.staged_path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "Failed to remove staged image on drop");
                }
            }
        }
    }
}

/// Which provider a description came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionSource {
    TextDetected,
    SceneDescription,
}

impl fmt::Display for DescriptionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextDetected => write!(f, "text-detected"),
            Self::SceneDescription => write!(f, "scene-description"),
        }
    }
}

/// The text derived from an image and its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionResult {
    pub text: String,
    pub source: DescriptionSource,
}

impl DescriptionResult {
    /// Label prepended to text recognized in the image.
    pub const TEXT_DETECTED_PREFIX: &'static str = "Text detected: ";

    pub fn text_detected(recognized: &str) -> Self {
        Self {
            text: format!("{}{}", Self::TEXT_DETECTED_PREFIX, recognized),
            source: DescriptionSource::TextDetected,
        }
    }

    pub fn scene(caption: String) -> Self {
        Self { text: caption, source: DescriptionSource::SceneDescription }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A narration file written by a speech synthesizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioArtifact {
    /// Derived filename, e.g. `output_cat.mp3`.
    pub filename: String,
    /// Location on disk.
    pub path: PathBuf,
    /// URL path under which the static route serves the file.
    pub url: String,
}

/// Terminal output of a pipeline run, serialized as the HTTP response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineResult {
    pub description: String,
    pub audio_url: Option<String>,
    #[serde(skip)]
    pub source: Option<DescriptionSource>,
}

impl PipelineResult {
    /// Both description stages produced nothing; no audio was generated.
    pub fn empty() -> Self {
        Self { description: String::new(), audio_url: None, source: None }
    }

    pub fn is_degenerate(&self) -> bool {
        self.description.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("narrator-core-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, b"img").unwrap();
        path
    }

    #[tokio::test]
    async fn release_removes_staged_file() {
        let path = temp_file("a.png");
        let payload = ImagePayload::new("a.png", b"img".to_vec(), path.clone());
        payload.release().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn release_tolerates_missing_file() {
        let path = temp_file("b.png");
        std::fs::remove_file(&path).unwrap();
        let payload = ImagePayload::new("b.png", b"img".to_vec(), path.clone());
        payload.release().await;
        assert!(!path.exists());
    }

    #[test]
    fn drop_removes_staged_file() {
        let path = temp_file("c.png");
        {
            let _payload = ImagePayload::new("c.png", b"img".to_vec(), path.clone());
        }
        assert!(!path.exists());
    }

    #[test]
    fn text_detected_description_keeps_text_verbatim() {
        let d = DescriptionResult::text_detected("STOP");
        assert_eq!(d.text, "Text detected: STOP");
        assert_eq!(d.source, DescriptionSource::TextDetected);
        assert_eq!(d.source.to_string(), "text-detected");
    }

    #[test]
    fn only_a_zero_length_description_is_empty() {
        assert!(DescriptionResult::scene(String::new()).is_empty());
        assert!(!DescriptionResult::scene("  ".into()).is_empty());
        assert!(!DescriptionResult::text_detected("").is_empty());
    }

    #[test]
    fn result_serializes_to_wire_shape() {
        let result = PipelineResult {
            description: "A cat".into(),
            audio_url: Some("/static/audio/output_cat.mp3".into()),
            source: Some(DescriptionSource::SceneDescription),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "description": "A cat", "audio_url": "/static/audio/output_cat.mp3" })
        );
        assert_eq!(
            serde_json::to_value(PipelineResult::empty()).unwrap(),
            serde_json::json!({ "description": "", "audio_url": null })
        );
    }
}
