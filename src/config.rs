use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::events::{FALLBACK_REPLY, GREETING};

/// Environment variable that overrides the configured endpoint
pub const ENDPOINT_ENV: &str = "STORECHAT_ENDPOINT";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the completion service
    pub endpoint: String,

    /// Per-request timeout; unset means wait for as long as it takes
    pub request_timeout_secs: Option<u64>,

    /// Text of the seeded bot turn
    pub greeting: String,

    /// Reply shown when the service answers without content
    pub fallback_reply: String,

    /// UI preferences
    pub ui: UiConfig,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub title: String,
    pub placeholder: String,
    pub start_open: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: "http://localhost:5000".to_string(),
            request_timeout_secs: None,
            greeting: GREETING.to_string(),
            fallback_reply: FALLBACK_REPLY.to_string(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            title: "Chatbot Assistant".to_string(),
            placeholder: "Type your message...".to_string(),
            start_open: false,
        }
    }
}

impl Config {
    /// `~/.storechat`
    pub fn home_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".storechat"))
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("config.toml"))
    }

    /// Load configuration from `~/.storechat/config.toml`
    pub fn load() -> Result<Self> {
        let home = Self::home_dir()?;
        fs::create_dir_all(&home).context("Failed to create .storechat directory")?;
        Self::load_from(&home.join("config.toml"))
    }

    /// Apply endpoint overrides; the flag wins over the environment, which
    /// wins over the file. Blank values are ignored.
    pub fn apply_overrides(&mut self, env: Option<String>, flag: Option<String>) {
        for endpoint in [env, flag].into_iter().flatten() {
            if !endpoint.trim().is_empty() {
                self.endpoint = endpoint;
            }
        }
    }

    /// Load from an explicit path, falling back to defaults when it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to `~/.storechat/config.toml`
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Full URL of the chat route
    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.endpoint.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_url_tolerates_trailing_slash() {
        let mut config = Config::default();
        assert_eq!(config.chat_url(), "http://localhost:5000/api/chat");

        config.endpoint = "https://shop.example.com/".to_string();
        assert_eq!(config.chat_url(), "https://shop.example.com/api/chat");
    }

    fn from_file() -> Config {
        toml::from_str(r#"endpoint = "http://file.example""#).unwrap()
    }

    #[test]
    fn file_endpoint_without_overrides() {
        let mut config = from_file();
        config.apply_overrides(None, None);
        assert_eq!(config.endpoint, "http://file.example");
    }

    #[test]
    fn env_beats_file() {
        let mut config = from_file();
        config.apply_overrides(Some("http://env.example".to_string()), None);
        assert_eq!(config.endpoint, "http://env.example");
    }

    #[test]
    fn blank_env_is_ignored() {
        let mut config = from_file();
        config.apply_overrides(Some("   ".to_string()), None);
        assert_eq!(config.endpoint, "http://file.example");
    }

    #[test]
    fn flag_beats_env() {
        let mut config = from_file();
        config.apply_overrides(
            Some("http://env.example".to_string()),
            Some("http://flag.example".to_string()),
        );
        assert_eq!(config.endpoint, "http://flag.example");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            endpoint = "http://10.0.0.2:8080"

            [ui]
            start_open = true
            "#,
        )
        .unwrap();

        assert_eq!(config.endpoint, "http://10.0.0.2:8080");
        assert_eq!(config.request_timeout_secs, None);
        assert_eq!(config.greeting, GREETING);
        assert!(config.ui.start_open);
        assert_eq!(config.ui.placeholder, "Type your message...");
    }
}
