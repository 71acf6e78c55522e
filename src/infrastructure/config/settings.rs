//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file in which every section and
//! field is optional. Two environment variables override file values:
//! `ALTO_TRACKER_ALERT_WEBHOOK` and `ALTO_TRACKER_DATA_DIR`.
//!
//! # Example
//!
//! ```no_run
//! use alto_tracker::infrastructure::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::logging::LoggingConfig;
use crate::adapter::outbound::scraper::CommandScraperConfig;
use crate::adapter::outbound::transport::WebhookConfig;
use crate::application::PollerConfig;
use crate::domain::Destination;
use crate::error::{ConfigError, Result};

pub const ENV_ALERT_WEBHOOK: &str = "ALTO_TRACKER_ALERT_WEBHOOK";
pub const ENV_DATA_DIR: &str = "ALTO_TRACKER_DATA_DIR";

/// Polling behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Marketplace root; entity pages live under `collections/` and
    /// `profile/`.
    pub marketplace_base_url: String,
    pub update_interval_minutes: u64,
    /// Upper bound on scrapes running at once, across polling and
    /// registration.
    pub max_concurrent_scrapes: usize,
    pub price_unit: String,
    /// Destination for scrape failure alerts.
    pub alert_destination: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            marketplace_base_url: "https://alto.build/".into(),
            update_interval_minutes: 5,
            max_concurrent_scrapes: 2,
            price_unit: "CANTO".into(),
            alert_destination: None,
        }
    }
}

/// External scraping program.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub program: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            program: "alto-scrape".into(),
            args: Vec::new(),
            timeout_secs: 90,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    pub sender_name: String,
    pub sender_avatar_url: Option<String>,
    pub request_timeout_secs: u64,
    /// Log notifications instead of sending them.
    pub dry_run: bool,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            sender_name: "Alto Tracker".into(),
            sender_avatar_url: None,
            request_timeout_secs: 10,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl StorageConfig {
    #[must_use]
    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join("history.json")
    }

    #[must_use]
    pub fn listeners_path(&self) -> PathBuf {
        self.data_dir.join("listeners.json")
    }

    #[must_use]
    pub fn allowed_groups_path(&self) -> PathBuf {
        self.data_dir.join("allowed_groups.json")
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tracker: TrackerConfig,
    pub scraper: ScraperConfig,
    pub notifier: NotifierConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content, then apply environment
    /// overrides and validate.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path` if it exists, otherwise start from defaults.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Self::parse_toml("")
        }
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(webhook) = lookup(ENV_ALERT_WEBHOOK).filter(|v| !v.trim().is_empty()) {
            self.tracker.alert_destination = Some(webhook);
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            self.storage.data_dir = PathBuf::from(dir);
        }
    }

    /// Validate configuration values and normalize the base URL to end in
    /// `/`.
    #[allow(clippy::result_large_err)]
    pub fn validate(&mut self) -> Result<()> {
        let tracker = &mut self.tracker;
        if tracker.marketplace_base_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "marketplace_base_url",
            }
            .into());
        }
        let base = Url::parse(&tracker.marketplace_base_url).map_err(|e| {
            ConfigError::InvalidValue {
                field: "marketplace_base_url",
                reason: e.to_string(),
            }
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "marketplace_base_url",
                reason: "must be an http(s) URL".to_string(),
            }
            .into());
        }
        if !tracker.marketplace_base_url.ends_with('/') {
            tracker.marketplace_base_url.push('/');
        }
        if tracker.update_interval_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "update_interval_minutes",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if tracker.max_concurrent_scrapes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_concurrent_scrapes",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if tracker.alert_destination.as_deref().is_some_and(|d| d.trim().is_empty()) {
            tracker.alert_destination = None;
        }

        if self.scraper.program.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "program" }.into());
        }
        if self.scraper.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.notifier.sender_name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "sender_name",
            }
            .into());
        }
        if self.notifier.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "format",
                reason: "must be \"pretty\" or \"json\"".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    #[must_use]
    pub fn poller(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_secs(self.tracker.update_interval_minutes * 60),
            max_concurrent_entities: self.tracker.max_concurrent_scrapes,
            alert_destination: self.tracker.alert_destination.clone().map(Destination::new),
        }
    }

    #[must_use]
    pub fn command_scraper(&self) -> CommandScraperConfig {
        CommandScraperConfig {
            program: self.scraper.program.clone(),
            args: self.scraper.args.clone(),
            timeout: Duration::from_secs(self.scraper.timeout_secs),
            price_unit: self.tracker.price_unit.clone(),
        }
    }

    #[must_use]
    pub fn webhook(&self) -> WebhookConfig {
        WebhookConfig {
            sender_name: self.notifier.sender_name.clone(),
            sender_avatar_url: self.notifier.sender_avatar_url.clone(),
            request_timeout: Duration::from_secs(self.notifier.request_timeout_secs),
        }
    }
}
