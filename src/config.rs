//! User configuration for model selection.
//!
//! The config file is optional. When absent, defaults select the command
//! port; CLI flags and `POSM_LM_COMMAND` layer on top.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const LM_COMMAND_ENV: &str = "POSM_LM_COMMAND";
pub const DEFAULT_LM_COMMAND: &str = "claude -p --model haiku";

const CONFIG_DIR_NAME: &str = "positioning-master";
const CONFIG_FILE_NAME: &str = "config.json";

/// Which model port implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Pipe prompts through an external command.
    #[default]
    Command,
    /// Call an OpenAI-compatible chat completions endpoint.
    Http,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PosmConfig {
    pub schema_version: u32,
    #[serde(default)]
    pub provider: Provider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lm_command: Option<String>,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-70b-versatile".to_string(),
            temperature: 0.8,
            api_key_env: "GROQ_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

pub fn default_config() -> PosmConfig {
    PosmConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        provider: Provider::default(),
        lm_command: None,
        http: HttpConfig::default(),
    }
}

/// Default config location (`$XDG_CONFIG_HOME/positioning-master/config.json`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

pub fn load_config(path: &Path) -> Result<PosmConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: PosmConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Load an explicit config, or the default one if present, or defaults.
///
/// An explicit path that does not exist is an error; a missing default file
/// is not.
pub fn resolve_config(explicit: Option<&Path>) -> Result<PosmConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match default_config_path() {
        Some(path) if path.is_file() => {
            tracing::debug!(path = %path.display(), "loading config");
            load_config(&path)
        }
        _ => Ok(default_config()),
    }
}

pub fn validate_config(config: &PosmConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    if let Some(command) = config.lm_command.as_deref() {
        if command.trim().is_empty() {
            return Err(anyhow!("lm_command must be non-empty"));
        }
    }
    let http = &config.http;
    if !(0.0..=2.0).contains(&http.temperature) {
        return Err(anyhow!(
            "http.temperature must be between 0.0 and 2.0 (got {})",
            http.temperature
        ));
    }
    if http.timeout_secs == 0 {
        return Err(anyhow!("http.timeout_secs must be greater than zero"));
    }
    if http.base_url.trim().is_empty() {
        return Err(anyhow!("http.base_url must be non-empty"));
    }
    if http.api_key_env.trim().is_empty() {
        return Err(anyhow!("http.api_key_env must be non-empty"));
    }
    Ok(())
}

/// Resolve the LM command: explicit arg > config > env var > default.
pub fn resolve_lm_command(explicit: Option<&str>, config: &PosmConfig) -> String {
    resolve_lm_command_with_env(explicit, config, env::var(LM_COMMAND_ENV).ok())
}

fn resolve_lm_command_with_env(
    explicit: Option<&str>,
    config: &PosmConfig,
    env_value: Option<String>,
) -> String {
    let non_blank = |command: &String| !command.trim().is_empty();
    explicit
        .map(str::to_string)
        .filter(non_blank)
        .or_else(|| config.lm_command.clone().filter(non_blank))
        .or_else(|| env_value.filter(non_blank))
        .unwrap_or_else(|| DEFAULT_LM_COMMAND.to_string())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
