//! Configuration management for crudboard

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upstream demo API
pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";

/// Environment variable overriding `api.base_url`
pub const BASE_URL_ENV: &str = "CRUDBOARD_BASE_URL";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub controller: ControllerConfig,
    pub shell: ShellConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout in seconds. Unset means the HTTP client default.
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            user_agent: format!("crudboard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    /// Seconds before a mutation error disappears from the error slot
    pub error_clear_secs: u64,
    /// Reject a second edit/delete/toggle on an item while one is pending
    pub guard_in_flight: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            error_clear_secs: 3,
            guard_in_flight: false,
        }
    }
}

impl ControllerConfig {
    pub fn error_clear_delay(&self) -> Duration {
        Duration::from_secs(self.error_clear_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
    pub color: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

impl Config {
    /// Load configuration from the default location, or defaults if absent.
    ///
    /// `CRUDBOARD_BASE_URL` is applied on top of whatever was loaded.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Config::default(),
        };
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            config.set_base_url(&url)?;
        }
        Ok(config)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        let base_url = config.api.base_url.clone();
        config.set_base_url(&base_url)?;
        Ok(config)
    }

    /// Get the configuration file path, if a config directory can be resolved
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "crudboard")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Validate and store a new base URL, trimming trailing slashes
    pub fn set_base_url(&mut self, raw: &str) -> Result<()> {
        let parsed =
            url::Url::parse(raw.trim()).with_context(|| format!("Invalid base URL: {}", raw))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Base URL must use http or https: {}", raw);
        }
        self.api.base_url = parsed.as_str().trim_end_matches('/').to_string();
        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://dummyjson.com");
        assert_eq!(config.api.timeout(), None);
        assert_eq!(config.controller.error_clear_secs, 3);
        assert!(!config.controller.guard_in_flight);
        assert!(config.shell.color);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [controller]
            guard_in_flight = true
            "#,
        )
        .unwrap();
        assert!(config.controller.guard_in_flight);
        assert_eq!(config.controller.error_clear_secs, 3);
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_set_base_url_trims_slash() {
        let mut config = Config::default();
        config.set_base_url("http://127.0.0.1:8080/").unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_set_base_url_rejects_garbage() {
        let mut config = Config::default();
        assert!(config.set_base_url("not a url").is_err());
        assert!(config.set_base_url("ftp://example.com").is_err());
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_toml_round_trip_of_effective_config() {
        let mut config = Config::default();
        config.api.timeout_secs = Some(10);
        let text = config.to_toml().unwrap();
        assert!(text.contains("[api]"));
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
