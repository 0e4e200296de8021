//! Config defaults: the values used for anything the config file leaves out.

use crate::schema::{AudioConfig, LoggingConfig, ProvidersConfig, ServerConfig, StorageConfig};

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 5000;

/// 16 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

pub const DEFAULT_AUDIO_DIR: &str = "static/audio";

pub const DEFAULT_AUDIO_URL_PREFIX: &str = "/static/audio";

pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_AUDIO_FORMAT: &str = "mp3";

pub const DEFAULT_LOG_LEVEL: &str = "info";

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            index_page: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: DEFAULT_UPLOAD_DIR.into(),
            audio_dir: DEFAULT_AUDIO_DIR.into(),
            audio_url_prefix: DEFAULT_AUDIO_URL_PREFIX.to_string(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            text_recognizer: Default::default(),
            scene_describer: Default::default(),
            speech: Default::default(),
            timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
            openai: Default::default(),
            gemini: Default::default(),
            elevenlabs: Default::default(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_AUDIO_FORMAT.to_string(),
            voice: None,
            speed: 1.0,
            unique_names: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_string(), dir: None }
    }
}
