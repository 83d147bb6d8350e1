//! Configuration loading for opsdeck-portal
//!
//! Values resolve in priority order: environment variables, then the TOML
//! config file, then compiled defaults.

use opsdeck_common::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Status stamped on timesheets when the caller omits one.
pub const DEFAULT_TASK_STATUS: &str = "Submitted";

/// Per-entry excerpt cap when building the summarization corpus, bounding
/// prompt size.
pub const CORPUS_EXCERPT_CHARS: usize = 2000;

/// Preview cap when logging an unrecognizable generation payload, so model
/// output never lands unbounded in the logs.
pub const MALFORMED_PREVIEW_CHARS: usize = 400;

/// Portal service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Socket address the HTTP server binds
    pub bind_addr: String,
    /// SQLite database file path
    pub database_path: PathBuf,
    /// Generation backend settings for the roll-up endpoint
    pub summary: SummaryConfig,
}

/// Generation backend settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// OpenAI-compatible endpoint base URL
    pub base_url: String,
    /// API key; optional for local backends
    pub api_key: Option<String>,
    /// Model used for roll-ups
    pub model: String,
    /// Request timeout in seconds for generation calls, the only
    /// unbounded-latency dependency
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8140".to_string(),
            database_path: PathBuf::from("opsdeck.db"),
            summary: SummaryConfig::default(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from the default location with env overrides.
    ///
    /// The config file path itself can be overridden with `OPSDECK_CONFIG`.
    pub fn load() -> Result<Self> {
        let path = match std::env::var("OPSDECK_CONFIG") {
            Ok(p) => PathBuf::from(p),
            Err(_) => default_config_path(),
        };

        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            tracing::info!("Loaded config from {}", path.display());
            Self::from_toml_str(&contents)?
        } else {
            tracing::info!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    /// Environment variables take priority over the config file.
    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("OPSDECK_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Ok(path) = std::env::var("OPSDECK_DB_PATH") {
            self.database_path = PathBuf::from(path);
        }
        if let Ok(url) = std::env::var("OPSDECK_SUMMARY_BASE_URL") {
            self.summary.base_url = url;
        }
        if let Ok(key) = std::env::var("OPSDECK_SUMMARY_API_KEY") {
            if !key.trim().is_empty() {
                self.summary.api_key = Some(key);
            }
        }
        if let Ok(model) = std::env::var("OPSDECK_SUMMARY_MODEL") {
            self.summary.model = model;
        }
    }
}

/// `~/.config/opsdeck/config.toml`, falling back to the working directory.
fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("opsdeck").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("opsdeck.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8140");
        assert_eq!(config.summary.timeout_secs, 30);
        assert!(config.summary.api_key.is_none());
    }

    #[test]
    fn parses_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:9000"

            [summary]
            model = "gpt-4o-mini"
            api_key = "sk-test"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.summary.model, "gpt-4o-mini");
        assert_eq!(config.summary.api_key.as_deref(), Some("sk-test"));
        // Unspecified fields keep their defaults
        assert_eq!(config.summary.timeout_secs, 30);
        assert_eq!(config.database_path, PathBuf::from("opsdeck.db"));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(Config::from_toml_str("bind_addr = [").is_err());
    }
}
