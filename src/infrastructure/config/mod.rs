//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::application::errors::ConfigError;
use crate::application::formatting::{COPY_LABEL, DIAGRAM_LANGUAGE};
use crate::application::messaging::typing::{TYPING_THROTTLE, TYPING_TIMEOUT};
use crate::application::services::copy_service::COPY_FEEDBACK;

/// Client configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub ui: UiConfig,
    pub formatter: FormatterConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ServerConfig {
    pub url: String,
    pub history_path: String,
    pub clear_path: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SessionConfig {
    /// Display name; a random `userNNN` name is used when unset
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UiConfig {
    pub typing_timeout_ms: u64,
    pub typing_throttle_ms: u64,
    pub copy_feedback_ms: u64,
    pub command_prefix: String,
    /// HTML transcript of the conversation, rewritten on every new entry
    pub transcript: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FormatterConfig {
    pub diagram_language: String,
    pub copy_label: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5000".to_string(),
            history_path: "/get_history".to_string(),
            clear_path: "/clear_history".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            typing_timeout_ms: TYPING_TIMEOUT.as_millis() as u64,
            typing_throttle_ms: TYPING_THROTTLE.as_millis() as u64,
            copy_feedback_ms: COPY_FEEDBACK.as_millis() as u64,
            command_prefix: "/".to_string(),
            transcript: None,
        }
    }
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            diagram_language: DIAGRAM_LANGUAGE.to_string(),
            copy_label: COPY_LABEL.to_string(),
        }
    }
}

impl UiConfig {
    pub fn typing_timeout(&self) -> Duration {
        Duration::from_millis(self.typing_timeout_ms)
    }

    pub fn typing_throttle(&self) -> Duration {
        Duration::from_millis(self.typing_throttle_ms)
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Environment variables override file settings
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("CHAT_SERVER_URL") {
            self.server.url = url;
        }

        if let Ok(name) = std::env::var("CHAT_USERNAME") {
            self.session.username = Some(name);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.url.trim().is_empty() {
            return Err(ConfigError::MissingField("server.url".to_string()));
        }
        let lang = &self.formatter.diagram_language;
        if lang.is_empty() || !lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::InvalidValue(format!(
                "formatter.diagram-language must be a word, got {:?}",
                lang
            )));
        }
        if self.ui.command_prefix.is_empty() {
            return Err(ConfigError::MissingField("ui.command-prefix".to_string()));
        }
        Ok(())
    }

    /// Absolute URL of the history endpoint
    pub fn history_url(&self) -> String {
        join_url(&self.server.url, &self.server.history_path)
    }

    /// Absolute URL of the clear-history endpoint
    pub fn clear_url(&self) -> String {
        join_url(&self.server.url, &self.server.clear_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = Config::from_yaml(
            "server:\n  url: http://chat.local:8080/\nsession:\n  username: amy\n",
        )
        .unwrap();
        assert_eq!(config.session.username.as_deref(), Some("amy"));
        assert_eq!(config.history_url(), "http://chat.local:8080/get_history");
        assert_eq!(config.clear_url(), "http://chat.local:8080/clear_history");
        assert_eq!(config.ui.typing_timeout(), TYPING_TIMEOUT);
        assert_eq!(config.formatter.diagram_language, "mermaid");
    }

    #[test]
    fn test_kebab_case_keys() {
        let config = Config::from_yaml(
            "ui:\n  typing-timeout-ms: 500\n  transcript: chat.html\nformatter:\n  copy-label: Kopieren\n",
        )
        .unwrap();
        assert_eq!(config.ui.typing_timeout(), Duration::from_millis(500));
        assert_eq!(config.ui.transcript, Some(PathBuf::from("chat.html")));
        assert_eq!(config.formatter.copy_label, "Kopieren");
    }

    #[test]
    fn test_invalid_diagram_language_is_rejected() {
        let err = Config::from_yaml("formatter:\n  diagram-language: \"x\\\" onload=\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_default_config_round_trips() {
        let yaml = Config::default().to_yaml().unwrap();
        let config = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.server.url, "http://localhost:5000");
    }
}
