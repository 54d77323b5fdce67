//! Storefront configuration.

use crate::checkout::DEFAULT_SUGGESTION_LIMIT;
use crate::error::CommerceError;
use anyhow::{Context, Result};
use doorstep_observability::{LogLevel, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// API base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Overrides `api.base_url`.
pub const ENV_API_URL: &str = "DOORSTEP_API_URL";

/// Overrides `logging.level`.
pub const ENV_LOG_LEVEL: &str = "DOORSTEP_LOG";

/// Storefront configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Backend API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Address suggestion settings.
    #[serde(default)]
    pub address: AddressConfig,

    /// Search box settings.
    #[serde(default)]
    pub search: SearchConfig,
}

impl StorefrontConfig {
    /// Load config from a file; `.json` files are parsed as JSON, anything
    /// else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            Self::from_toml_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Parse TOML config text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `DOORSTEP_API_URL` and `DOORSTEP_LOG` from the process
    /// environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL).filter(|url| !url.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            match LogLevel::parse(&level) {
                Some(level) => self.logging.level = level,
                None => warn!(value = %level, "ignoring unknown {}", ENV_LOG_LEVEL),
            }
        }
        self
    }

    /// Reject settings the storefront cannot run with.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CommerceError::Config(format!(
                "api.base_url must be an http(s) URL, got {:?}",
                self.api.base_url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(CommerceError::Config(
                "api.timeout_secs must be positive".to_string(),
            ));
        }
        if self.address.suggestion_limit == 0 {
            return Err(CommerceError::Config(
                "address.suggestion_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Install the global subscriber described by `logging`.
    ///
    /// Returns `false` if a subscriber was already installed.
    pub fn init_logging(&self) -> Result<bool, CommerceError> {
        Ok(doorstep_observability::init_logging(&self.logging)?)
    }
}

/// Backend API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL including the `/api` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Address suggestion settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressConfig {
    /// Maximum number of city suggestions.
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            suggestion_limit: default_suggestion_limit(),
        }
    }
}

fn default_suggestion_limit() -> usize {
    DEFAULT_SUGGESTION_LIMIT
}

/// Search box settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period before a query is sent.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Queries shorter than this are not sent.
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_min_query_len() -> usize {
    2
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorstep_observability::LogFormat;

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::default();
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.address.suggestion_limit, 8);
        assert_eq!(config.search.debounce_ms, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = StorefrontConfig::from_toml_str(
            r#"
            [api]
            base_url = "https://api.doorstep.test/api"

            [logging]
            level = "debug"
            format = "human"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://api.doorstep.test/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Human);
        assert_eq!(config.search.min_query_len, 2);
    }

    #[test]
    fn test_load_json_and_toml_files() {
        let dir = std::env::temp_dir().join(format!("doorstep-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let json_path = dir.join("storefront.json");
        std::fs::write(&json_path, r#"{"address": {"suggestion_limit": 5}}"#).unwrap();
        assert_eq!(StorefrontConfig::load(&json_path).unwrap().address.suggestion_limit, 5);

        let toml_path = dir.join("storefront.toml");
        std::fs::write(&toml_path, "[search]\ndebounce_ms = 150\n").unwrap();
        assert_eq!(StorefrontConfig::load(&toml_path).unwrap().search.debounce_ms, 150);

        std::fs::write(&toml_path, "[search\n").unwrap();
        let err = StorefrontConfig::load(&toml_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML config"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let err = StorefrontConfig::load("/nonexistent/doorstep.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::default().with_overrides(|key| match key {
            ENV_API_URL => Some(" https://prod.test/api ".to_string()),
            ENV_LOG_LEVEL => Some("warn".to_string()),
            _ => None,
        });
        assert_eq!(config.api.base_url, "https://prod.test/api");
        assert_eq!(config.logging.level, LogLevel::Warn);

        let unchanged = StorefrontConfig::default()
            .with_overrides(|key| (key == ENV_LOG_LEVEL).then(|| "chatty".to_string()));
        assert_eq!(unchanged.logging.level, LogLevel::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = StorefrontConfig::default();
        config.api.base_url = "localhost:5000".to_string();
        assert!(matches!(config.validate(), Err(CommerceError::Config(_))));

        let mut config = StorefrontConfig::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
