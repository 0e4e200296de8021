//! Core types and capability contracts for the Narrator pipeline.
//!
//! The pipeline turns an uploaded image into a spoken description. Every
//! external capability it needs (text recognition, scene description, speech
//! synthesis) is a trait here so implementations can be swapped freely.

pub mod error;
pub mod naming;
pub mod traits;
pub mod types;

pub use error::{ProviderError, ValidationError};
pub use naming::{derive_audio_name, file_stem, sanitize_filename, AUDIO_NAME_PREFIX};
pub use traits::{SceneDescriber, SpeechSynthesizer, TextRecognizer};
pub use types::{AudioArtifact, DescriptionResult, DescriptionSource, ImagePayload, PipelineResult};
