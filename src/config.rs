//! Configuration management for the Opportunities Hub client.
//!
//! Loads configuration from ${OPPHUB_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::paths;

/// Default config template with comments, embedded at compile time.
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("default_config.toml");

/// Default base URL for the WordPress content source.
pub const DEFAULT_CONTENT_BASE_URL: &str = "https://opportunitieshub.org/wp-json/wp/v2";

/// Default base URL for the backend API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.opportunitieshub.org/api";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Optional content source base URL (for test rigs or proxies)
    pub content_base_url: Option<String>,

    /// Optional backend API base URL (for test rigs or proxies)
    pub api_base_url: Option<String>,

    /// Posts fetched per page
    pub page_size: Option<u32>,

    /// Number of posts in the "fresh" rail
    pub fresh_limit: Option<u32>,
}

impl Config {
    const DEFAULT_PAGE_SIZE: u32 = 10;
    const DEFAULT_FRESH_LIMIT: u32 = 5;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the default config template to the config path if absent.
    ///
    /// Returns true if a new file was created.
    pub fn init() -> Result<bool> {
        let path = paths::config_path();
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, DEFAULT_CONFIG_TEMPLATE)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(true)
    }

    /// Resolves the content source base URL.
    /// Precedence: OPPHUB_CONTENT_BASE_URL env > config > default.
    pub fn content_base_url(&self) -> Result<String> {
        resolve_base_url(
            "OPPHUB_CONTENT_BASE_URL",
            self.content_base_url.as_deref(),
            DEFAULT_CONTENT_BASE_URL,
        )
    }

    /// Resolves the backend API base URL.
    /// Precedence: OPPHUB_API_BASE_URL env > config > default.
    pub fn api_base_url(&self) -> Result<String> {
        resolve_base_url(
            "OPPHUB_API_BASE_URL",
            self.api_base_url.as_deref(),
            DEFAULT_API_BASE_URL,
        )
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(Self::DEFAULT_PAGE_SIZE)
    }

    pub fn fresh_limit(&self) -> u32 {
        self.fresh_limit.unwrap_or(Self::DEFAULT_FRESH_LIMIT)
    }
}

/// Resolves a base URL with precedence: env > config > default.
/// Validates that the URL is well-formed.
fn resolve_base_url(env_var: &str, config_url: Option<&str>, default: &str) -> Result<String> {
    if let Ok(env_url) = std::env::var(env_var) {
        let trimmed = env_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.trim_end_matches('/').to_string());
        }
    }

    if let Some(config_url) = config_url {
        let trimmed = config_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.trim_end_matches('/').to_string());
        }
    }

    Ok(default.to_string())
}

/// Validates that a URL is well-formed.
fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid base URL: {url}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: missing config file yields defaults.
    #[test]
    fn test_load_missing_file_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::load_from(&temp.path().join("config.toml")).unwrap();
        assert!(config.content_base_url.is_none());
        assert_eq!(config.page_size(), 10);
        assert_eq!(config.fresh_limit(), 5);
    }

    /// Test: config file values override defaults.
    #[test]
    fn test_load_from_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "content_base_url = \"http://localhost:8080/wp-json/wp/v2\"\npage_size = 25\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(
            config.content_base_url.as_deref(),
            Some("http://localhost:8080/wp-json/wp/v2")
        );
        assert_eq!(config.page_size(), 25);
    }

    /// Test: config base URL is used when no env override is set.
    #[test]
    fn test_base_url_from_config() {
        let config = Config {
            api_base_url: Some("http://localhost:9999/api/".to_string()),
            ..Config::default()
        };
        // Trailing slash is trimmed so path joins stay predictable.
        assert_eq!(config.api_base_url().unwrap(), "http://localhost:9999/api");
    }

    /// Test: malformed base URL is rejected.
    #[test]
    fn test_invalid_base_url_rejected() {
        let config = Config {
            api_base_url: Some("not a url".to_string()),
            ..Config::default()
        };
        assert!(config.api_base_url().is_err());
    }
}
