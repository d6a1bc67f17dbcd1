//! Application configuration for PolicyDiff.
//!
//! User config lives at `~/.policydiff/policydiff.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PolicyDiffError, Result};
use crate::types::DEFAULT_MAX_CHUNK_WORDS;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "policydiff.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".policydiff";

// ---------------------------------------------------------------------------
// Config structs (matching policydiff.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// OpenAI settings.
    #[serde(default)]
    pub openai: OpenAiConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Word budget for a single comparison chunk.
    #[serde(default = "default_max_chunk_words")]
    pub max_chunk_words: usize,

    /// Default output directory for patched documents.
    #[serde(default = "default_out_dir")]
    pub out_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_chunk_words: default_max_chunk_words(),
            out_dir: default_out_dir(),
        }
    }
}

fn default_max_chunk_words() -> usize {
    DEFAULT_MAX_CHUNK_WORDS
}
fn default_out_dir() -> String {
    ".".into()
}

/// `[openai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Default model for comparison prompts.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature for comparison prompts.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f64 {
    0.6
}

// ---------------------------------------------------------------------------
// Compare config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime comparison configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    /// Word budget for a single comparison chunk.
    pub max_chunk_words: usize,
}

impl From<&AppConfig> for CompareConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_chunk_words: config.defaults.max_chunk_words,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.policydiff/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PolicyDiffError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.policydiff/policydiff.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PolicyDiffError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        PolicyDiffError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PolicyDiffError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PolicyDiffError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PolicyDiffError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the OpenAI API key env var is set and non-empty.
/// Returns the key value on success.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.openai.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(PolicyDiffError::config(format!(
            "OpenAI API key not found. Set the {var_name} environment variable."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("max_chunk_words"));
        assert!(toml_str.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.max_chunk_words, 1000);
        assert_eq!(parsed.openai.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
max_chunk_words = 500
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.max_chunk_words, 500);
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert!((config.openai.temperature - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn compare_config_from_app_config() {
        let app = AppConfig::default();
        let compare = CompareConfig::from(&app);
        assert_eq!(compare.max_chunk_words, 1000);
    }

    #[test]
    fn api_key_resolution_fails_when_unset() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.openai.api_key_env = "PD_TEST_NONEXISTENT_KEY_12345".into();
        let result = resolve_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }
}
