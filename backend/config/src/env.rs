//! Environment handling for config values.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references inside string values, resolved at load time.
//!   Only uppercase `[A-Z_][A-Z0-9_]*` names are matched; `$${VAR}` escapes to
//!   a literal `${VAR}`.
//! - `NARRATOR_*` variables (and the usual provider API key variables) that
//!   override the loaded file.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

use crate::schema::NarratorConfig;

/// Optional `$` escape followed by a variable reference.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config value tree using `env`.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Collect all env var names referenced in a config value tree (for diagnostics).
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    let mut vars = Vec::new();
    collect_vars_recursive(value, &mut vars);
    vars.sort();
    vars.dedup();
    vars
}

fn collect_vars_recursive(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            for caps in ENV_VAR_PATTERN.captures_iter(s) {
                if caps[1].is_empty() {
                    out.push(caps[2].to_string());
                }
            }
        }
        Value::Array(arr) => arr.iter().for_each(|v| collect_vars_recursive(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_vars_recursive(v, out)),
        _ => {}
    }
}

/// Apply `NARRATOR_*` overrides and fill provider API keys from their
/// conventional variables when the file leaves them unset.
pub fn apply_env_overrides(mut config: NarratorConfig, env: &HashMap<String, String>) -> NarratorConfig {
    let get = |key: &str| env.get(key).filter(|v| !v.is_empty()).cloned();

    if let Some(bind) = get("NARRATOR_BIND") {
        config.server.bind_address = bind;
    }
    if let Some(port) = get("NARRATOR_PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => warn!(value = %port, "Ignoring invalid NARRATOR_PORT"),
        }
    }
    if let Some(dir) = get("NARRATOR_UPLOAD_DIR") {
        config.storage.upload_dir = dir.into();
    }
    if let Some(dir) = get("NARRATOR_AUDIO_DIR") {
        config.storage.audio_dir = dir.into();
    }
    if let Some(level) = get("NARRATOR_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(backend) = get("NARRATOR_OCR") {
        override_backend(&mut config.providers.text_recognizer, "NARRATOR_OCR", &backend);
    }
    if let Some(backend) = get("NARRATOR_VISION") {
        override_backend(&mut config.providers.scene_describer, "NARRATOR_VISION", &backend);
    }
    if let Some(backend) = get("NARRATOR_TTS") {
        override_backend(&mut config.providers.speech, "NARRATOR_TTS", &backend);
    }

    let providers = &mut config.providers;
    if providers.openai.api_key.is_none() {
        providers.openai.api_key = get("OPENAI_API_KEY");
    }
    if providers.gemini.api_key.is_none() {
        providers.gemini.api_key = get("GEMINI_API_KEY");
    }
    if providers.elevenlabs.api_key.is_none() {
        providers.elevenlabs.api_key = get("ELEVENLABS_API_KEY");
    }
    config
}

fn override_backend<T: serde::de::DeserializeOwned>(slot: &mut T, var: &str, value: &str) {
    match serde_json::from_value::<T>(Value::String(value.to_ascii_lowercase())) {
        Ok(parsed) => *slot = parsed,
        Err(_) => warn!(var, value, "Ignoring unknown provider backend"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SpeechBackend, VisionBackend};
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_nested_vars() {
        let v = json!({"providers": {"openai": {"api_key": "${OPENAI_API_KEY}"}}});
        let result = resolve_env_vars_with(&v, &env(&[("OPENAI_API_KEY", "sk-abc123")])).unwrap();
        assert_eq!(result["providers"]["openai"]["api_key"], "sk-abc123");
    }

    #[test]
    fn error_on_missing_var_names_path() {
        let v = json!({"storage": {"audio_dir": "${AUDIO_ROOT}/audio"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err().to_string();
        assert!(err.contains("AUDIO_ROOT"));
        assert!(err.contains("storage.audio_dir"));
    }

    #[test]
    fn escaped_reference_is_kept_literal() {
        let v = json!({"k": "$${NOT_A_VAR} and ${REAL}"});
        let result = resolve_env_vars_with(&v, &env(&[("REAL", "yes")])).unwrap();
        assert_eq!(result["k"], "${NOT_A_VAR} and yes");
        assert_eq!(collect_referenced_vars(&v), vec!["REAL".to_string()]);
    }

    #[test]
    fn overrides_take_precedence_over_file() {
        let config = apply_env_overrides(
            NarratorConfig::default(),
            &env(&[
                ("NARRATOR_PORT", "9000"),
                ("NARRATOR_AUDIO_DIR", "/srv/audio"),
                ("NARRATOR_TTS", "OpenAI"),
                ("NARRATOR_VISION", "gemini"),
                ("OPENAI_API_KEY", "sk-env"),
            ]),
        );
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.audio_dir, std::path::PathBuf::from("/srv/audio"));
        assert_eq!(config.providers.speech, SpeechBackend::OpenAi);
        assert_eq!(config.providers.scene_describer, VisionBackend::Gemini);
        assert_eq!(config.providers.openai.api_key.as_deref(), Some("sk-env"));
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let config = apply_env_overrides(
            NarratorConfig::default(),
            &env(&[("NARRATOR_PORT", "not-a-port"), ("NARRATOR_OCR", "tesseract")]),
        );
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.providers.text_recognizer, VisionBackend::Mock);
    }

    #[test]
    fn file_api_key_wins_over_env() {
        let mut config = NarratorConfig::default();
        config.providers.openai.api_key = Some("sk-file".into());
        let config = apply_env_overrides(config, &env(&[("OPENAI_API_KEY", "sk-env")]));
        assert_eq!(config.providers.openai.api_key.as_deref(), Some("sk-file"));
    }
}
