//! Configuration for the triage engine and CLI
//!
//! TOML file with three sections. API keys are never stored in the file; the
//! file names the environment variable that holds the key.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Providers the CLI knows how to construct
pub const KNOWN_PROVIDERS: &[&str] = &["openai", "anthropic"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriageConfig {
    pub llm: LlmSection,
    #[serde(default)]
    pub triage: TriageSection,
    #[serde(default)]
    pub store: StoreSection,
}

/// Text-generation provider settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmSection {
    /// "openai" or "anthropic"
    pub provider: String,
    pub model: String,
    /// Environment variable containing the API key
    pub api_key_env: String,
    /// Override the provider's API base URL (proxies, test servers)
    #[serde(default)]
    pub base_url: Option<String>,
    /// 0.0 to 2.0
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriageSection {
    /// Trailing messages included when re-analyzing a ticket
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Upper bound on the single invocation attempt
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for TriageSection {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl TriageSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Ticket store settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreSection {
    /// JSON snapshot backing the in-memory store
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    500
}

fn default_history_window() -> usize {
    crate::triage::prompt::DEFAULT_HISTORY_WINDOW
}

fn default_timeout_ms() -> u64 {
    15_000
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TriageConfig {
    /// Load and validate configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: TriageConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !KNOWN_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(ConfigError::InvalidConfig(format!(
                "Unknown LLM provider '{}', expected one of: {}",
                self.llm.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "llm.model must not be empty".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::InvalidConfig(format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.triage.history_window == 0 {
            return Err(ConfigError::InvalidConfig(
                "triage.history_window must be at least 1".to_string(),
            ));
        }

        if self.triage.timeout_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "triage.timeout_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get LLM API key from environment variable
    pub fn get_llm_api_key(&self) -> Result<String, ConfigError> {
        std::env::var(&self.llm.api_key_env)
            .map_err(|_| ConfigError::EnvVarNotFound(self.llm.api_key_env.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[llm]
provider = "openai"
model = "gpt-4o-mini"
api_key_env = "OPENAI_API_KEY"
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = TriageConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.llm.temperature, 0.1);
        assert_eq!(config.llm.max_tokens, 500);
        assert!(config.llm.base_url.is_none());
        assert_eq!(config.triage.history_window, 5);
        assert_eq!(config.triage.timeout(), Duration::from_secs(15));
        assert!(config.store.path.is_none());
    }

    #[test]
    fn test_full_config() {
        let config = TriageConfig::from_toml_str(
            r#"
[llm]
provider = "anthropic"
model = "claude-3-5-haiku-20241022"
api_key_env = "ANTHROPIC_API_KEY"
base_url = "http://localhost:8080"
temperature = 0.0
max_tokens = 300

[triage]
history_window = 3
timeout_ms = 5000

[store]
path = "tickets.json"
"#,
        )
        .unwrap();

        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.triage.history_window, 3);
        assert_eq!(config.store.path, Some(PathBuf::from("tickets.json")));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let toml = MINIMAL.replace("openai", "mistral");
        let err = TriageConfig::from_toml_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(msg) if msg.contains("mistral")));
    }

    #[test]
    fn test_zero_history_window_rejected() {
        let toml = format!("{MINIMAL}\n[triage]\nhistory_window = 0\n");
        assert!(matches!(
            TriageConfig::from_toml_str(&toml),
            Err(ConfigError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let toml = format!("{MINIMAL}\n[triage]\ntimeout_ms = 0\n");
        assert!(matches!(
            TriageConfig::from_toml_str(&toml),
            Err(ConfigError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_temperature_out_of_range_rejected() {
        let toml = MINIMAL.replace(
            "api_key_env = \"OPENAI_API_KEY\"",
            "api_key_env = \"OPENAI_API_KEY\"\ntemperature = 2.5",
        );
        assert!(matches!(
            TriageConfig::from_toml_str(&toml),
            Err(ConfigError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_llm_section_is_parse_error() {
        assert!(matches!(
            TriageConfig::from_toml_str("[triage]\nhistory_window = 2\n"),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_missing_api_key_env() {
        let mut config = TriageConfig::from_toml_str(MINIMAL).unwrap();
        config.llm.api_key_env = "TICKET_TRIAGE_TEST_UNSET_KEY_VAR".to_string();
        assert!(matches!(
            config.get_llm_api_key(),
            Err(ConfigError::EnvVarNotFound(name)) if name == "TICKET_TRIAGE_TEST_UNSET_KEY_VAR"
        ));
    }
}
