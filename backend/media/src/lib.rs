//! Media handling for Narrator: the image-to-narration pipeline, upload
//! staging, and static serving of generated audio.

pub mod media_server;
pub mod mime_detect;
pub mod pipeline;
pub mod staging;

pub use media_server::media_router;
pub use mime_detect::{detect_mime_type, is_audio, is_inline_safe};
pub use pipeline::{ImagePipeline, DEFAULT_PROVIDER_TIMEOUT};
pub use staging::{validate_filename, StagingError, UploadStager};
