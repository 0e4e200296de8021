pub mod engine;
pub mod synthesizer;

pub use engine::{
    create_tts, AudioFormat, ElevenLabsTts, MockTts, OpenAiTts, TtsProvider, TtsProviderKind, TtsRequest,
};
pub use synthesizer::FileSpeechSynthesizer;
