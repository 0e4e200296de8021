//! Image understanding providers: text recognition and scene description.

pub mod ocr;
pub mod vision;

pub use ocr::{MockTextRecognizer, VisionTextRecognizer};
pub use vision::{MockSceneDescriber, VisionClient, VisionProvider, VisionSceneDescriber};
