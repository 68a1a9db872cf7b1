//! Environment variable handling and .env file management

use crate::config::validation::ConfigValidator;
use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load the given env file if it exists; variables already set win
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# PingPlot Configuration
#
# Values here are used as defaults and can be overridden by command-line
# arguments.

# Host name or IP address to probe
# PINGPLOT_HOST=1.1.1.1

# Minimum time between probe starts in milliseconds (0-10000, 0 = back to back)
# PINGPLOT_INTERVAL_MS=0

# Per-probe reply timeout in milliseconds (1-10000)
# PINGPLOT_TIMEOUT_MS=1000

# Seconds of history to keep (1.0-300.0)
# PINGPLOT_HISTORY_SECONDS=15.0

# Enable colored output (true/false)
# ENABLE_COLOR=true

# Example: a gentle once-per-second probe with five minutes of history
# PINGPLOT_INTERVAL_MS=1000
# PINGPLOT_HISTORY_SECONDS=300
"#
        .to_string()
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        let content = Self::create_example_env_content();
        std::fs::write(path, content)
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))?;

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "PINGPLOT_HOST" => {
                ConfigValidator::validate_host(value)?;
            }
            "PINGPLOT_INTERVAL_MS" => {
                let interval: i64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid PINGPLOT_INTERVAL_MS value '{}': {}", value, e)))?;
                ConfigValidator::validate_interval_ms(interval)?;
            }
            "PINGPLOT_TIMEOUT_MS" => {
                let timeout: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid PINGPLOT_TIMEOUT_MS value '{}': {}", value, e)))?;
                ConfigValidator::validate_timeout_ms(timeout)?;
            }
            "PINGPLOT_HISTORY_SECONDS" => {
                let history: f64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid PINGPLOT_HISTORY_SECONDS value '{}': {}", value, e)))?;
                ConfigValidator::validate_history_seconds(history)?;
            }
            "ENABLE_COLOR" => {
                value.parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {
                // Unknown environment variable, ignore
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("PINGPLOT_HOST", "Host name or IP address to probe", "1.1.1.1"),
            ("PINGPLOT_INTERVAL_MS", "Probe interval in milliseconds (0-10000)", "0"),
            ("PINGPLOT_TIMEOUT_MS", "Probe timeout in milliseconds (1-10000)", "1000"),
            ("PINGPLOT_HISTORY_SECONDS", "Seconds of history to keep (1.0-300.0)", "15.0"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<26} {}\n", var, description));
            help.push_str(&format!("  {:<26} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(name, _, _)| {
                let value = std::env::var(name).ok()?;
                Self::validate_env_var(name, &value).err().map(|e| format!("Warning: {}", e))
            })
            .collect()
    }

    /// Check `.env` in the current directory, if present
    pub fn check_env_file() -> Result<Option<Vec<String>>> {
        Self::check_env_file_at(Path::new(".env"))
    }

    /// Validate each assignment in an env file without loading it
    pub fn check_env_file_at(path: &Path) -> Result<Option<Vec<String>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read {}: {}", path.display(), e)))?;

        let mut warnings = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.split_once('=') {
                Some((key, value)) => {
                    if let Err(e) = Self::validate_env_var(key.trim(), value) {
                        warnings.push(format!("Line '{}': {}", line, e));
                    }
                }
                None => warnings.push(format!("Line '{}': expected KEY=VALUE", line)),
            }
        }

        Ok(Some(warnings))
    }
}
