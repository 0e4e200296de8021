//! `narrator-config`: runtime configuration for the Narrator service.
//!
//! Provides:
//! - Typed config schema with defaults for every field
//! - YAML loading
//! - `${ENV_VAR}` substitution and `NARRATOR_*` overrides
//! - Config redaction for safe logging/display
//! - Validation with errors and warnings

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

// Re-export most-used types at crate root.
pub use env::{
    apply_env_overrides, collect_referenced_vars, resolve_env_vars_with,
    MissingEnvVarError,
};
pub use io::{config_dir, config_file_path, load_raw_config, resolve_config_path};
pub use redact::{collect_redacted_paths, redact, redacted_config};
pub use schema::{
    AudioConfig, ElevenLabsConfig, GeminiConfig, LoggingConfig, NarratorConfig, OpenAiConfig,
    ProvidersConfig, ServerConfig, SpeechBackend, StorageConfig, VisionBackend,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Load a config file, substitute env vars, apply overrides, and validate.
///
/// Validation problems are returned in the report for the caller to log or
/// act on; only unreadable or undeserializable input is an `Err`.
pub async fn load_and_prepare(path: &Path) -> Result<(NarratorConfig, ValidationReport)> {
    let env: HashMap<String, String> = std::env::vars().collect();
    let raw = load_raw_config(path).await?;
    prepare(&raw, &env)
}

/// The processing half of [`load_and_prepare`], separated for testing.
pub fn prepare(raw: &serde_json::Value, env: &HashMap<String, String>) -> Result<(NarratorConfig, ValidationReport)> {
    let value = resolve_env_vars_with(raw, env).context("Failed to resolve env vars in config")?;

    let config: NarratorConfig =
        serde_json::from_value(value).context("Failed to deserialize config")?;

    let config = apply_env_overrides(config, env);

    let report = validate(&config);
    Ok((config, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prepare_runs_substitution_then_overrides() {
        let raw = json!({
            "providers": { "speech": "openai", "openai": { "api_key": "${MY_KEY}" } },
            "server": { "port": 7000 }
        });
        let env: HashMap<String, String> = [
            ("MY_KEY".to_string(), "sk-from-env".to_string()),
            ("NARRATOR_PORT".to_string(), "7100".to_string()),
        ]
        .into_iter()
        .collect();

        let (config, report) = prepare(&raw, &env).unwrap();
        assert_eq!(config.providers.openai.api_key.as_deref(), Some("sk-from-env"));
        assert_eq!(config.server.port, 7100);
        assert!(report.is_valid());
    }

    #[test]
    fn unknown_backend_is_a_deserialize_error() {
        let raw = json!({ "providers": { "speech": "festival" } });
        assert!(prepare(&raw, &HashMap::new()).is_err());
    }
}
