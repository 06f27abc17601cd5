//! Configuration management for the anime dashboard.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable that overrides `jikan.base_url`
pub const BASE_URL_ENV: &str = "JIKAN_API_URL";

/// Where a loaded configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from the given file
    File,
    /// The file does not exist; defaults were used
    Defaults,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    pub logging: LoggingConfig,

    /// Jikan API settings
    pub jikan: JikanConfig,

    /// Suggestion cache settings
    #[serde(default)]
    pub suggestions: SuggestionConfig,

    /// Default widget values for the views
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Jikan API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JikanConfig {
    /// Jikan API base URL
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Minimum spacing between two permitted requests, in milliseconds
    pub min_interval_ms: u64,

    /// Maximum requests per minute (sliding window)
    pub requests_per_minute: u32,
}

/// Suggestion cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// Seconds a cached suggestion list stays valid
    pub ttl_seconds: u64,

    /// Number of suggestions requested per term
    pub limit: u32,
}

/// Default widget values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Initial minimum score for the search view
    pub search_min_score: f64,

    /// Initial minimum score for the top anime view
    pub top_min_score: f64,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 300,
            limit: 5,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            search_min_score: 5.0,
            top_min_score: 7.0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                log_dir: "logs".to_string(),
                default_level: "info".to_string(),
                console: true,
                file: false,
                json_format: false,
            },
            jikan: JikanConfig {
                base_url: "https://api.jikan.moe/v4".to_string(),
                timeout_secs: 30,
                user_agent: "anime-dashboard/0.1.0".to_string(),
                rate_limit: RateLimitConfig {
                    min_interval_ms: 1000,
                    requests_per_minute: 60,
                },
            },
            suggestions: SuggestionConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, reporting where it came from
    ///
    /// A missing file yields the defaults. Nothing is logged here: this runs
    /// before logging is initialized, so callers report the source instead.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, ConfigSource)> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok((Self::default(), ConfigSource::Defaults));
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok((config, ConfigSource::File))
    }

    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(path).map(|(config, _)| config)
    }

    /// Load configuration from a TOML file or create default if not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::from_file(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            Self::default()
        })
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Apply environment overrides (only the API base URL is configurable this way)
    pub fn apply_env_overrides(&mut self) {
        self.apply_base_url_override(std::env::var(BASE_URL_ENV).ok());
    }

    fn apply_base_url_override(&mut self, value: Option<String>) {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            tracing::info!(base_url = %url, "Using API base URL from {}", BASE_URL_ENV);
            self.jikan.base_url = url.trim_end_matches('/').to_string();
        }
    }
}
