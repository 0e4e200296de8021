//! Config validation: checks with user-friendly error messages.

use crate::schema::{NarratorConfig, SpeechBackend, VisionBackend};
use thiserror::Error;

/// Audio formats the speech engines can be asked for.
pub const SUPPORTED_AUDIO_FORMATS: &[&str] = &["mp3", "opus", "aac", "flac", "wav"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &NarratorConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_storage(config, &mut report);
    validate_providers(config, &mut report);
    validate_audio(config, &mut report);
    report
}

fn validate_server(config: &NarratorConfig, report: &mut ValidationReport) {
    let server = &config.server;
    if server.port == 0 {
        report.error("server.port", "Port must be between 1 and 65535");
    }
    if server.bind_address.trim().is_empty() {
        report.error("server.bind_address", "Bind address cannot be empty");
    }
    if server.max_upload_bytes == 0 {
        report.error("server.max_upload_bytes", "Upload limit must be greater than zero");
    }
}

fn validate_storage(config: &NarratorConfig, report: &mut ValidationReport) {
    let storage = &config.storage;
    if storage.upload_dir.as_os_str().is_empty() {
        report.error("storage.upload_dir", "Upload directory cannot be empty");
    }
    if storage.audio_dir.as_os_str().is_empty() {
        report.error("storage.audio_dir", "Audio directory cannot be empty");
    }
    if storage.upload_dir == storage.audio_dir {
        report.error(
            "storage.audio_dir",
            "Audio directory must differ from the upload directory, which is cleared per request",
        );
    }
    if !storage.audio_url_prefix.starts_with('/') {
        report.error("storage.audio_url_prefix", "URL prefix must start with '/'");
    }
    if storage.audio_url_prefix.trim_end_matches('/').is_empty() {
        report.error("storage.audio_url_prefix", "Audio cannot be mounted at the site root");
    }
}

fn validate_providers(config: &NarratorConfig, report: &mut ValidationReport) {
    let providers = &config.providers;
    if providers.timeout_secs == 0 {
        report.error("providers.timeout_secs", "Provider timeout must be at least one second");
    }

    for (path, backend) in [
        ("providers.text_recognizer", providers.text_recognizer),
        ("providers.scene_describer", providers.scene_describer),
    ] {
        match backend {
            VisionBackend::OpenAi if providers.openai.api_key.is_none() => {
                report.error(path, "OpenAI selected but providers.openai.api_key is not set")
            }
            VisionBackend::Gemini if providers.gemini.api_key.is_none() => {
                report.error(path, "Gemini selected but providers.gemini.api_key is not set")
            }
            _ => {}
        }
    }

    match providers.speech {
        SpeechBackend::OpenAi if providers.openai.api_key.is_none() => report.error(
            "providers.speech",
            "OpenAI selected but providers.openai.api_key is not set",
        ),
        SpeechBackend::ElevenLabs if providers.elevenlabs.api_key.is_none() => report.error(
            "providers.speech",
            "ElevenLabs selected but providers.elevenlabs.api_key is not set",
        ),
        _ => {}
    }

    if providers.text_recognizer == VisionBackend::Mock
        || providers.scene_describer == VisionBackend::Mock
        || providers.speech == SpeechBackend::Mock
    {
        report.warn("providers", "Mock providers are in use; output is placeholder data");
    }
}

fn validate_audio(config: &NarratorConfig, report: &mut ValidationReport) {
    let audio = &config.audio;
    if !SUPPORTED_AUDIO_FORMATS.contains(&audio.format.to_ascii_lowercase().as_str()) {
        report.error(
            "audio.format",
            format!("Unsupported format '{}'; expected one of {:?}", audio.format, SUPPORTED_AUDIO_FORMATS),
        );
    }
    if !(0.25..=4.0).contains(&audio.speed) {
        report.error("audio.speed", "Speed must be between 0.25 and 4.0");
    }
    if audio.format.to_ascii_lowercase() != "mp3" && config.providers.speech != SpeechBackend::OpenAi {
        report.warn("audio.format", "Only the OpenAI engine honours formats other than mp3");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_with_mock_warning() {
        let report = validate(&NarratorConfig::default());
        assert!(report.is_valid(), "{:?}", report.errors);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, "providers");
    }

    #[test]
    fn hosted_backend_requires_api_key() {
        let mut config = NarratorConfig::default();
        config.providers.scene_describer = VisionBackend::Gemini;
        config.providers.speech = SpeechBackend::ElevenLabs;
        let report = validate(&config);
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["providers.scene_describer", "providers.speech"]);
    }

    #[test]
    fn shared_upload_and_audio_dir_is_rejected() {
        let mut config = NarratorConfig::default();
        config.storage.audio_dir = config.storage.upload_dir.clone();
        assert!(!validate(&config).is_valid());
    }

    #[test]
    fn bad_audio_settings_are_reported() {
        let mut config = NarratorConfig::default();
        config.audio.format = "ogg".into();
        config.audio.speed = 9.0;
        config.providers.timeout_secs = 0;
        let report = validate(&config);
        assert_eq!(report.errors.len(), 3);
        assert!(report.errors[0].to_string().contains("providers.timeout_secs"));
    }
}
