//! Configuration validation utilities and rules
//!
//! Range checks here are shared by the config loader, the CLI value parsers
//! and the controller, so every entry point rejects the same values.

use crate::{
    defaults::{
        MAX_CAPACITY, MAX_HISTORY_SECONDS, MAX_INTERVAL_MS, MAX_REFRESH_MS, MAX_TIMEOUT_MS, MIN_CAPACITY,
        MIN_HISTORY_SECONDS, MIN_INTERVAL_MS, MIN_REFRESH_MS, MIN_TIMEOUT_MS,
    },
    error::{AppError, Result},
    models::Config,
    probe::resolve::parse_literal,
};
use colored::{Color, Colorize};
use std::net::IpAddr;
use std::time::Duration;

/// Timeouts above this are accepted but slow down failure detection
const LONG_TIMEOUT_MS: u64 = 5_000;

/// Configuration validator with advisory checks on top of the hard ranges
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration and collect advisory warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();

        config.validate()?;

        warnings.extend(Self::validate_target(&config.host));
        warnings.extend(Self::validate_probe_settings(config));
        warnings.extend(Self::validate_history_coverage(config));

        Ok(warnings)
    }

    /// Non-blank host, returned trimmed
    pub fn validate_host(host: &str) -> Result<String> {
        let trimmed = host.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_config("Host cannot be empty"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(AppError::invalid_config(format!("Host '{}' contains whitespace", trimmed)));
        }
        Ok(trimmed.to_string())
    }

    /// Probe interval in milliseconds, 0 to 10000 inclusive
    pub fn validate_interval_ms(ms: i64) -> Result<Duration> {
        if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&ms) {
            return Err(AppError::invalid_config(format!(
                "Interval must be between {} and {} ms, got {}",
                MIN_INTERVAL_MS, MAX_INTERVAL_MS, ms
            )));
        }
        Ok(Duration::from_millis(ms.unsigned_abs()))
    }

    /// Probe timeout in milliseconds, 1 to 10000 inclusive
    pub fn validate_timeout_ms(ms: u64) -> Result<Duration> {
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&ms) {
            return Err(AppError::invalid_config(format!(
                "Timeout must be between {} and {} ms, got {}",
                MIN_TIMEOUT_MS, MAX_TIMEOUT_MS, ms
            )));
        }
        Ok(Duration::from_millis(ms))
    }

    /// Desired history duration in seconds, 1.0 to 300.0 inclusive
    pub fn validate_history_seconds(seconds: f64) -> Result<f64> {
        // NaN fails the range check
        if !(MIN_HISTORY_SECONDS..=MAX_HISTORY_SECONDS).contains(&seconds) {
            return Err(AppError::invalid_config(format!(
                "History must be between {:.1} and {:.1} seconds, got {}",
                MIN_HISTORY_SECONDS, MAX_HISTORY_SECONDS, seconds
            )));
        }
        Ok(seconds)
    }

    /// Readout refresh period in milliseconds, 10 to 1000 inclusive
    pub fn validate_refresh_ms(ms: u64) -> Result<Duration> {
        if !(MIN_REFRESH_MS..=MAX_REFRESH_MS).contains(&ms) {
            return Err(AppError::invalid_config(format!(
                "Refresh period must be between {} and {} ms, got {}",
                MIN_REFRESH_MS, MAX_REFRESH_MS, ms
            )));
        }
        Ok(Duration::from_millis(ms))
    }

    fn validate_target(host: &str) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let Some(ip) = parse_literal(host.trim()) else {
            return warnings;
        };

        let (loopback, private) = match ip {
            IpAddr::V4(v4) => (v4.is_loopback(), v4.is_private() || v4.is_link_local()),
            // fc00::/7 unique local
            IpAddr::V6(v6) => (v6.is_loopback(), (v6.segments()[0] & 0xfe00) == 0xfc00),
        };

        if loopback {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Target {} is a loopback address; latency will not reflect the network", ip),
            ));
        } else if private {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Target {} is in a private address range", ip),
            ));
        }
        if ip.is_unspecified() || ip.is_multicast() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Target {} will not answer echo requests as a single host", ip),
            ));
        }

        warnings
    }

    fn validate_probe_settings(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.interval_ms == 0 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "Interval 0 probes back to back; the target or an intermediate firewall may rate-limit ICMP"
                    .to_string(),
            ));
        }

        if config.timeout_ms > LONG_TIMEOUT_MS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Long timeout of {} ms will slow down failure detection", config.timeout_ms),
            ));
        }

        warnings
    }

    /// Compare the history the buffer can actually hold with what was asked for.
    ///
    /// Only predictable when an interval is set, since the interval then
    /// bounds the probe rate.
    fn validate_history_coverage(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        if config.interval_ms == 0 {
            return warnings;
        }

        let expected_rate = 1000.0 / config.interval_ms as f64;
        let wanted = expected_rate * config.history_seconds;
        if wanted > MAX_CAPACITY as f64 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "History of {:.1} s at ~{:.1} probes/s needs {:.0} samples; only the last {} are kept",
                    config.history_seconds, expected_rate, wanted, MAX_CAPACITY
                ),
            ));
        } else if wanted < MIN_CAPACITY as f64 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "At ~{:.1} probes/s the minimum of {} samples covers about {:.0} s, more than the {:.1} s requested",
                    expected_rate,
                    MIN_CAPACITY,
                    MIN_CAPACITY as f64 / expected_rate,
                    config.history_seconds
                ),
            ));
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
    Error,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Blue,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            format!("{} {}", tag.color(self.level.color()).bold(), self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
