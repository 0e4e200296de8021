//! `narrator check-config`: show the effective configuration and its problems.

use std::path::Path;

use anyhow::{bail, Result};
use narrator_config::{
    collect_redacted_paths, collect_referenced_vars, load_raw_config, redacted_config, NarratorConfig,
    ValidationReport,
};

pub async fn run(path: &Path, config: &NarratorConfig, report: &ValidationReport) -> Result<()> {
    if path.exists() {
        println!("Config file: {}", path.display());
    } else {
        println!("Config file: {} (not found, using defaults)", path.display());
    }
    println!("{}", serde_json::to_string_pretty(&redacted_config(config))?);
    println!();

    let env_vars = referenced_env_vars(path).await?;
    if !env_vars.is_empty() {
        println!("Environment variables referenced: {}", env_vars.join(", "));
    }
    let secrets = secret_paths(config);
    if !secrets.is_empty() {
        println!("Secrets set (redacted above): {}", secrets.join(", "));
    }

    for warning in &report.warnings {
        println!("  🟡 {}: {}", warning.path, warning.message);
    }
    for error in &report.errors {
        println!("  🔴 {}: {}", error.path, error.message);
    }

    if !report.is_valid() {
        bail!("{} config error(s) found", report.errors.len());
    }
    println!("✅ Configuration is valid.");
    Ok(())
}

/// `${VAR}` names used by the file itself, before substitution.
async fn referenced_env_vars(path: &Path) -> Result<Vec<String>> {
    Ok(collect_referenced_vars(&load_raw_config(path).await?))
}

/// Config paths holding a secret value, after env substitution and overrides.
fn secret_paths(config: &NarratorConfig) -> Vec<String> {
    serde_json::to_value(config)
        .map(|value| collect_redacted_paths(&value))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_env_vars_named_in_the_file() {
        let dir = std::env::temp_dir().join(format!("narrator-check-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yaml");
        std::fs::write(
            &path,
            "providers:\n  openai:\n    api_key: \"${OPENAI_KEY}\"\nstorage:\n  audio_dir: \"${AUDIO_ROOT}/audio\"\n",
        )
        .unwrap();

        let vars = referenced_env_vars(&path).await.unwrap();
        assert_eq!(vars, vec!["AUDIO_ROOT".to_string(), "OPENAI_KEY".to_string()]);
        assert!(referenced_env_vars(&dir.join("absent.yaml")).await.unwrap().is_empty());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn reports_only_secrets_that_are_set() {
        let mut config = NarratorConfig::default();
        assert!(secret_paths(&config).is_empty());

        config.providers.elevenlabs.api_key = Some("el-123456".into());
        assert_eq!(secret_paths(&config), vec!["providers.elevenlabs.api_key".to_string()]);
    }
}
