//! Configuration for generation backends and node identity.
//!
//! Loaded from `~/.souschef/config.ini`; a missing file yields documented
//! defaults. `OPENAI_API_KEY` in the environment overrides the file value.
//!
//! ```ini
//! [openai]
//! api_key =
//! model = gpt-3.5-turbo
//! temperature = 0.7
//! max_tokens = 1000
//!
//! [ollama]
//! url = http://localhost:11434
//! model = llama3.2:1b
//!
//! [node]
//! system_name = smart-cooking
//! ```

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default hosted model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
/// Default sampling temperature for the hosted API.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Default completion token budget for the hosted API.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
/// Default local server URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Default local model.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:1b";
/// Default system/process name used in logs.
pub const DEFAULT_SYSTEM_NAME: &str = "smart-cooking";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or parse the config file
    #[error("failed to read config file: {0}")]
    Read(#[from] ini::Error),

    /// A value could not be interpreted
    #[error("invalid configuration: {section}.{key} = '{value}'")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },
}

/// Complete application configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    /// Hosted API settings
    pub openai: OpenAiSettings,
    /// Local server settings
    pub ollama: OllamaSettings,
    /// Node identity settings
    pub node: NodeSettings,
}

/// Hosted API configuration.
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    /// API key; empty means the hosted API is not configured.
    pub api_key: String,
    /// Chat model name.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Completion token budget.
    pub max_tokens: u32,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Local server configuration.
#[derive(Debug, Clone)]
pub struct OllamaSettings {
    /// Server URL.
    pub url: String,
    /// Model name.
    pub model: String,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
        }
    }
}

/// Node identity configuration.
#[derive(Debug, Clone)]
pub struct NodeSettings {
    /// Name of the overall system, used in logs.
    pub system_name: String,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            system_name: DEFAULT_SYSTEM_NAME.to_string(),
        }
    }
}

impl ConfigFile {
    /// Load configuration from the default path (~/.souschef/config.ini).
    ///
    /// A missing file yields defaults. `OPENAI_API_KEY` in the environment
    /// overrides the file's API key.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&config_file_path())?;
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                config.openai.api_key = key;
            }
        }
        Ok(config)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        parse_ini(&ini)
    }
}

/// Path of the user configuration file.
pub fn config_file_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".souschef")
        .join("config.ini")
}

fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigError> {
    let mut config = ConfigFile::default();

    if let Some(section) = ini.section(Some("openai")) {
        if let Some(value) = section.get("api_key") {
            config.openai.api_key = value.to_string();
        }
        if let Some(value) = section.get("model") {
            config.openai.model = value.to_string();
        }
        if let Some(value) = section.get("temperature") {
            config.openai.temperature =
                parse_value("openai", "temperature", value)?;
        }
        if let Some(value) = section.get("max_tokens") {
            config.openai.max_tokens = parse_value("openai", "max_tokens", value)?;
        }
    }

    if let Some(section) = ini.section(Some("ollama")) {
        if let Some(value) = section.get("url") {
            config.ollama.url = value.to_string();
        }
        if let Some(value) = section.get("model") {
            config.ollama.model = value.to_string();
        }
    }

    if let Some(section) = ini.section(Some("node")) {
        if let Some(value) = section.get("system_name") {
            config.node.system_name = value.to_string();
        }
    }

    Ok(config)
}

fn parse_value<T: std::str::FromStr>(
    section: &str,
    key: &str,
    value: &str,
) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("nope.ini")).unwrap();

        assert_eq!(config.openai.model, DEFAULT_OPENAI_MODEL);
        assert_eq!(config.openai.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(config.openai.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.ollama.url, DEFAULT_OLLAMA_URL);
        assert_eq!(config.node.system_name, DEFAULT_SYSTEM_NAME);
    }

    #[test]
    fn test_values_override_defaults() {
        let (_dir, path) = write_config(
            "[openai]\napi_key = sk-abc\nmodel = gpt-4\ntemperature = 0.2\nmax_tokens = 500\n\
             [ollama]\nurl = http://10.0.0.2:11434\nmodel = mistral:7b\n\
             [node]\nsystem_name = test-kitchen\n",
        );

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.openai.api_key, "sk-abc");
        assert_eq!(config.openai.model, "gpt-4");
        assert_eq!(config.openai.temperature, 0.2);
        assert_eq!(config.openai.max_tokens, 500);
        assert_eq!(config.ollama.url, "http://10.0.0.2:11434");
        assert_eq!(config.ollama.model, "mistral:7b");
        assert_eq!(config.node.system_name, "test-kitchen");
    }

    #[test]
    fn test_partial_sections_keep_remaining_defaults() {
        let (_dir, path) = write_config("[openai]\nmodel = gpt-4o-mini\n");

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(config.ollama.model, DEFAULT_OLLAMA_MODEL);
    }

    #[test]
    fn test_invalid_numeric_value_is_rejected() {
        let (_dir, path) = write_config("[openai]\ntemperature = warm\n");

        let err = ConfigFile::load_from(&path).unwrap_err();
        match err {
            ConfigError::InvalidValue { section, key, value } => {
                assert_eq!(section, "openai");
                assert_eq!(key, "temperature");
                assert_eq!(value, "warm");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
