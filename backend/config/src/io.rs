//! Config file location and loading.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the Narrator config directory.
/// Priority: `NARRATOR_CONFIG_DIR` env > `~/.narrator/` > `./.narrator`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("NARRATOR_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".narrator"),
        None => PathBuf::from(".narrator"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Pick the config file: explicit path > `NARRATOR_CONFIG` env > default location.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("NARRATOR_CONFIG") {
        return PathBuf::from(path);
    }
    config_file_path(&config_dir())
}

/// Read a YAML config file into an untyped value.
///
/// Returns an empty mapping if the file doesn't exist, so every field falls
/// back to its default.
pub async fn load_raw_config(path: &Path) -> Result<Value> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let value: Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    // An empty file parses as null.
    Ok(if value.is_null() { Value::Object(Default::default()) } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("narrator-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[tokio::test]
    async fn missing_file_is_empty_mapping() {
        let value = load_raw_config(&temp_path("absent.yaml")).await.unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[tokio::test]
    async fn empty_file_is_empty_mapping() {
        let path = temp_path("empty.yaml");
        std::fs::write(&path, "").unwrap();
        assert_eq!(load_raw_config(&path).await.unwrap(), serde_json::json!({}));
    }

    #[tokio::test]
    async fn malformed_yaml_names_the_file() {
        let path = temp_path("bad.yaml");
        std::fs::write(&path, "server: [unclosed").unwrap();
        let err = load_raw_config(&path).await.unwrap_err();
        assert!(format!("{err}").contains("bad.yaml"));
    }

    #[test]
    fn explicit_path_wins() {
        let p = PathBuf::from("/etc/narrator.yaml");
        assert_eq!(resolve_config_path(Some(&p)), p);
    }
}
