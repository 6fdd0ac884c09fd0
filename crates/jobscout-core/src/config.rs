//! Configuration management for Jobscout.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. Every value has a default, so an absent
//! config file is never an error.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/jobscout/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Search defaults (pagination and result limits)
    pub search: SearchConfig,
    /// Outgoing request throttling for the listing source
    pub rate_limit: RateLimitConfig,
    /// Backoff settings shared by the scraper and the matcher
    pub retry: RetryConfig,
    /// Analysis provider settings
    pub analysis: AnalysisConfig,
    /// Listing source settings
    pub source: SourceConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, falling back to defaults if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `JOBSCOUT_PAGE_SIZE`: Override listings requested per page
    /// - `JOBSCOUT_MAX_RESULTS`: Override the listing cap per run
    /// - `JOBSCOUT_CONCURRENCY`: Override simultaneous analysis calls
    /// - `JOBSCOUT_RETRY_COUNT`: Override retries per call
    /// - `ANTHROPIC_API_KEY`: Analysis provider credentials (never read from file)
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env();
        Ok(config)
    }

    /// Apply `JOBSCOUT_*` environment overrides to an already loaded config.
    pub fn apply_env(&mut self) {
        if let Some(page_size) = env_parse("JOBSCOUT_PAGE_SIZE") {
            self.search.page_size = page_size;
            tracing::debug!("Override search.page_size from env: {}", page_size);
        }

        if let Some(max_results) = env_parse("JOBSCOUT_MAX_RESULTS") {
            self.search.max_results = max_results;
            tracing::debug!("Override search.max_results from env: {}", max_results);
        }

        if let Some(concurrency) = env_parse("JOBSCOUT_CONCURRENCY") {
            self.analysis.concurrency = concurrency;
            tracing::debug!("Override analysis.concurrency from env: {}", concurrency);
        }

        if let Some(retry_count) = env_parse("JOBSCOUT_RETRY_COUNT") {
            self.retry.retry_count = retry_count;
            tracing::debug!("Override retry.retry_count from env: {}", retry_count);
        }

        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            if !key.trim().is_empty() {
                self.analysis.api_key = Some(key);
            }
        }
    }

    /// Check every value that would otherwise fail later at run time.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.search.page_size == 0 {
            return Err(ConfigError::invalid("search.page_size", "must be at least 1"));
        }
        if self.search.max_results == 0 {
            return Err(ConfigError::invalid("search.max_results", "must be at least 1"));
        }
        if self.rate_limit.requests_per_interval == 0 {
            return Err(ConfigError::invalid(
                "rate_limit.requests_per_interval",
                "must be at least 1",
            ));
        }
        if self.rate_limit.interval_ms == 0 {
            return Err(ConfigError::invalid("rate_limit.interval_ms", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.retry.backoff_jitter) {
            return Err(ConfigError::invalid(
                "retry.backoff_jitter",
                format!("must be within [0, 1], got {}", self.retry.backoff_jitter),
            ));
        }
        if self.retry.backoff_max_ms < self.retry.backoff_base_ms {
            return Err(ConfigError::invalid(
                "retry.backoff_max_ms",
                "must not be smaller than retry.backoff_base_ms",
            ));
        }
        if self.analysis.concurrency == 0 {
            return Err(ConfigError::invalid("analysis.concurrency", "must be at least 1"));
        }
        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let config_dir = path.parent().ok_or_else(|| {
            ConfigError::invalid("config_path", "no parent directory")
        })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/jobscout/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "jobscout", "jobscout").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|val| val.trim().parse().ok())
}

/// Search defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Listings requested per page (bounded by the source's own limit)
    pub page_size: usize,
    /// Maximum number of listings collected per run
    pub max_results: usize,
    /// Search radius in miles
    pub distance_miles: u32,
    /// Only listings posted within this many days (unset = any time)
    pub posted_within_days: Option<u32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_results: 50,
            distance_miles: 25,
            posted_within_days: None,
        }
    }
}

/// Token-bucket settings for the listing source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests allowed per interval
    pub requests_per_interval: u32,
    /// Interval length in milliseconds
    pub interval_ms: u64,
}

impl RateLimitConfig {
    /// Interval as a `Duration`.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_interval: 1,
            interval_ms: 2000,
        }
    }
}

/// Backoff settings shared by both retry sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub retry_count: u32,
    /// Base delay in milliseconds, doubled per attempt
    pub backoff_base_ms: u64,
    /// Upper bound for a single delay in milliseconds
    pub backoff_max_ms: u64,
    /// Jitter fraction: each delay is scaled by a factor in `[1 - j, 1 + j]`
    pub backoff_jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_count: 3,
            backoff_base_ms: 1000,
            backoff_max_ms: 60_000,
            backoff_jitter: 0.5,
        }
    }
}

/// Analysis provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Maximum simultaneous analysis calls
    pub concurrency: usize,
    /// Model identifier sent to the provider
    pub model: String,
    /// Maximum tokens for one analysis
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Provider API key (environment only, never persisted)
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            concurrency: 3,
            model: "claude-3-5-sonnet-20241022".to_string(),
            max_tokens: 1000,
            temperature: 0.5,
            timeout_secs: 60,
            api_key: None,
        }
    }
}

/// Listing source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Search endpoint
    pub base_url: String,
    /// User agent string
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Fetch each listing's detail page for its full description
    pub fetch_descriptions: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search"
                .to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            timeout_secs: 10,
            fetch_descriptions: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.search.page_size, 10);
        assert_eq!(config.search.max_results, 50);
        assert_eq!(config.rate_limit.requests_per_interval, 1);
        assert_eq!(config.retry.retry_count, 3);
        assert_eq!(config.analysis.concurrency, 3);
        assert!(config.source.fetch_descriptions);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[search]"));
        assert!(toml_str.contains("[rate_limit]"));
        assert!(toml_str.contains("[retry]"));
        assert!(!toml_str.contains("api_key"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.analysis.model, config.analysis.model);
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.search.page_size = 5;
        config.analysis.concurrency = 7;
        config.save_to(&config_path).expect("save config");

        let loaded = AppConfig::load_from(&config_path).expect("load config");
        assert_eq!(loaded.search.page_size, 5);
        assert_eq!(loaded.analysis.concurrency, 7);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().expect("create temp dir");
        let loaded =
            AppConfig::load_from(&tmp.path().join("absent.toml")).expect("defaults for absent");
        assert_eq!(loaded.search.max_results, 50);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[search]
max_results = 5

[retry]
retry_count = 0
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.retry.retry_count, 0);
        // These should be defaults
        assert_eq!(config.search.page_size, 25);
        assert_eq!(config.rate_limit.interval_ms, 2000);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = AppConfig::default();
        config.search.page_size = 0;
        let err = config.validate().expect_err("zero page size");
        assert!(err.to_string().contains("search.page_size"));

        let mut config = AppConfig::default();
        config.analysis.concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.retry.backoff_jitter = 1.5;
        assert!(config.validate().is_err());
    }
}
