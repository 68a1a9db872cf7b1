//! Configuration data model and validation

use crate::config::validation::ConfigValidator;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the live readout is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(AppError::parse(format!("Unknown output format '{}' (expected text or json)", other))),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host name or literal IP address to probe
    #[serde(default = "default_host")]
    pub host: String,

    /// Extra delay between probes in milliseconds
    #[serde(default)]
    pub interval_ms: u64,

    /// Per-probe reply timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Desired wall-clock span of retained history
    #[serde(default = "default_history_seconds")]
    pub history_seconds: f64,

    /// Readout refresh cadence in milliseconds
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,

    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    #[serde(default)]
    pub format: OutputFormat,

    /// Probe with synthetic latencies instead of ICMP
    #[serde(default)]
    pub simulate: bool,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            interval_ms: crate::defaults::DEFAULT_INTERVAL_MS,
            timeout_ms: default_timeout_ms(),
            history_seconds: default_history_seconds(),
            refresh_ms: default_refresh_ms(),
            enable_color: default_enable_color(),
            format: OutputFormat::default(),
            simulate: false,
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn refresh(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }

    /// Validate the configuration and return the first violation
    pub fn validate(&self) -> Result<()> {
        ConfigValidator::validate_host(&self.host)?;
        ConfigValidator::validate_interval_ms(i64::try_from(self.interval_ms).unwrap_or(i64::MAX))?;
        ConfigValidator::validate_timeout_ms(self.timeout_ms)?;
        ConfigValidator::validate_history_seconds(self.history_seconds)?;
        ConfigValidator::validate_refresh_ms(self.refresh_ms)?;
        Ok(())
    }

    /// Settings for one probing session
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            host: self.host.trim().to_string(),
            interval: self.interval(),
            timeout: self.timeout(),
            history_seconds: self.history_seconds,
        }
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("PINGPLOT_HOST") {
            let host = host.trim();
            if !host.is_empty() {
                self.host = host.to_string();
            }
        }

        if let Ok(interval) = std::env::var("PINGPLOT_INTERVAL_MS") {
            self.interval_ms = interval.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PINGPLOT_INTERVAL_MS value '{}': {}", interval, e)))?;
        }

        if let Ok(timeout) = std::env::var("PINGPLOT_TIMEOUT_MS") {
            self.timeout_ms = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PINGPLOT_TIMEOUT_MS value '{}': {}", timeout, e)))?;
        }

        if let Ok(history) = std::env::var("PINGPLOT_HISTORY_SECONDS") {
            self.history_seconds = history.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PINGPLOT_HISTORY_SECONDS value '{}': {}", history, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

/// The subset of configuration a probing session runs with
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub host: String,
    /// Extra delay after each probe; zero probes back to back
    pub interval: Duration,
    pub timeout: Duration,
    pub history_seconds: f64,
}

impl SessionConfig {
    pub fn new<S: Into<String>>(host: S) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_history_seconds(mut self, seconds: f64) -> Self {
        self.history_seconds = seconds;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Config::default().session()
    }
}

// Default value functions for serde
fn default_host() -> String {
    crate::defaults::DEFAULT_HOST.to_string()
}

fn default_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT_MS
}

fn default_history_seconds() -> f64 {
    crate::defaults::DEFAULT_HISTORY_SECONDS
}

fn default_refresh_ms() -> u64 {
    crate::defaults::DEFAULT_REFRESH_MS
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.host, "1.1.1.1");
        assert_eq!(config.interval_ms, 0);
        assert_eq!(config.timeout(), Duration::from_millis(1000));
        assert_eq!(config.history_seconds, 15.0);
        assert_eq!(config.refresh(), Duration::from_millis(33));
    }

    #[test]
    fn test_empty_host_invalid() {
        let config = Config { host: "   ".to_string(), ..Config::default() };
        assert!(matches!(config.validate(), Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn test_interval_upper_bound() {
        let mut config = Config::default();
        config.interval_ms = 10_000;
        assert!(config.validate().is_ok());
        config.interval_ms = 10_001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_history_bounds() {
        let mut config = Config::default();
        config.history_seconds = 0.5;
        assert!(config.validate().is_err());
        config.history_seconds = 300.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_invalid() {
        let config = Config { timeout_ms: 0, ..Config::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_session_trims_host() {
        let config = Config { host: " example.com ".to_string(), interval_ms: 250, ..Config::default() };
        let session = config.session();
        assert_eq!(session.host, "example.com");
        assert_eq!(session.interval, Duration::from_millis(250));
        assert_eq!(session.timeout, Duration::from_millis(1000));
    }

    #[test]
    fn test_session_builder() {
        let session = SessionConfig::new("192.0.2.1")
            .with_interval(Duration::from_millis(5))
            .with_timeout(Duration::from_millis(50))
            .with_history_seconds(2.0);
        assert_eq!(session.host, "192.0.2.1");
        assert_eq!(session.interval, Duration::from_millis(5));
        assert_eq!(session.timeout, Duration::from_millis(50));
        assert_eq!(session.history_seconds, 2.0);
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: Config = serde_json::from_str(r#"{"host": "example.com", "format": "json"}"#).unwrap();
        assert_eq!(config.host, "example.com");
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.timeout_ms, 1000);
        assert_eq!(config.history_seconds, 15.0);
    }
}
