//! Command-line interface

pub mod commands;

pub use commands::SessionCommand;

use crate::config::validation::ConfigValidator;
use crate::models::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// PingPlot - continuous latency monitor for a single host
#[derive(Parser, Debug, Clone)]
#[command(name = "pingplot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Host name or IP address to probe [default: 1.1.1.1]
    #[arg(short = 'H', long, value_parser = parse_host)]
    pub host: Option<String>,

    /// Minimum time between probe starts in milliseconds (0-10000) [default: 0]
    #[arg(short, long, value_name = "MS", value_parser = parse_interval_ms)]
    pub interval: Option<u64>,

    /// Per-probe reply timeout in milliseconds (1-10000) [default: 1000]
    #[arg(short, long, value_name = "MS", value_parser = parse_timeout_ms)]
    pub timeout: Option<u64>,

    /// Seconds of history to keep (1.0-300.0) [default: 15]
    #[arg(long, value_name = "SECONDS", value_parser = parse_history_seconds)]
    pub history: Option<f64>,

    /// Readout refresh period in milliseconds (10-1000) [default: 33]
    #[arg(long, value_name = "MS", value_parser = parse_refresh_ms)]
    pub refresh: Option<u64>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(short, long, value_name = "SECONDS", value_parser = parse_run_duration)]
    pub duration: Option<u64>,

    /// Readout format: text or json
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Probe with synthetic latencies instead of ICMP
    #[arg(long)]
    pub simulate: bool,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Describe the supported environment variables and exit
    #[arg(long)]
    pub env_help: bool,

    /// Write an example .env file to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub write_example_env: Option<PathBuf>,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }
        Ok(())
    }

    /// True when the invocation only asks for information and probes nothing
    pub fn is_informational(&self) -> bool {
        self.env_help || self.write_example_env.is_some()
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }

    /// Get configuration summary for display
    pub fn get_config_summary(&self) -> String {
        fn or_default<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(T::to_string).unwrap_or_else(|| "default".to_string())
        }

        let mut summary = String::new();
        summary.push_str("Configuration Summary:\n");
        summary.push_str(&format!("  Host: {}\n", or_default(&self.host)));
        summary.push_str(&format!("  Interval (ms): {}\n", or_default(&self.interval)));
        summary.push_str(&format!("  Timeout (ms): {}\n", or_default(&self.timeout)));
        summary.push_str(&format!("  History (s): {}\n", or_default(&self.history)));
        summary.push_str(&format!("  Refresh (ms): {}\n", or_default(&self.refresh)));
        if let Some(duration) = self.duration {
            summary.push_str(&format!("  Run for: {}s\n", duration));
        }
        summary.push_str(&format!("  Simulated probes: {}\n", self.simulate));
        summary.push_str(&format!("  Colored output: {}\n", self.use_colors()));
        summary.push_str(&format!("  Verbose mode: {}\n", self.verbose));
        summary.push_str(&format!("  Debug mode: {}\n", self.debug));
        summary
    }
}

/// Digits only; rejects signs, hex and empty input
fn parse_whole_number(s: &str, what: &str) -> Result<u64, String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("Invalid {}: '{}'", what, s));
    }
    s.parse::<u64>().map_err(|_| format!("Invalid {}: '{}'", what, s))
}

fn parse_host(s: &str) -> Result<String, String> {
    ConfigValidator::validate_host(s).map_err(|e| e.to_string())
}

fn parse_interval_ms(s: &str) -> Result<u64, String> {
    let ms = parse_whole_number(s, "interval")?;
    let signed = i64::try_from(ms).map_err(|_| format!("Interval out of range: {}", s))?;
    ConfigValidator::validate_interval_ms(signed).map_err(|e| e.to_string())?;
    Ok(ms)
}

fn parse_timeout_ms(s: &str) -> Result<u64, String> {
    let ms = parse_whole_number(s, "timeout")?;
    ConfigValidator::validate_timeout_ms(ms).map_err(|e| e.to_string())?;
    Ok(ms)
}

fn parse_refresh_ms(s: &str) -> Result<u64, String> {
    let ms = parse_whole_number(s, "refresh period")?;
    ConfigValidator::validate_refresh_ms(ms).map_err(|e| e.to_string())?;
    Ok(ms)
}

fn parse_history_seconds(s: &str) -> Result<f64, String> {
    if s.starts_with('+') {
        return Err(format!("Invalid history: '{}'", s));
    }
    let seconds: f64 = s.parse().map_err(|_| format!("Invalid history: '{}'", s))?;
    ConfigValidator::validate_history_seconds(seconds).map_err(|e| e.to_string())
}

/// Run duration in whole seconds, 1 to one day
fn parse_run_duration(s: &str) -> Result<u64, String> {
    let secs = parse_whole_number(s, "duration")?;
    if secs == 0 {
        Err("Duration must be greater than 0".to_string())
    } else if secs > 86_400 {
        Err("Duration cannot exceed 86400 seconds".to_string())
    } else {
        Ok(secs)
    }
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_defaults() {
        let cli = Cli::parse_from(["pingplot"]);
        assert_eq!(cli.host, None);
        assert_eq!(cli.interval, None);
        assert_eq!(cli.timeout, None);
        assert_eq!(cli.history, None);
        assert_eq!(cli.duration, None);
        assert!(!cli.simulate);
        assert!(!cli.is_informational());
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let cli = Cli::parse_from([
            "pingplot",
            "--host", "example.com",
            "--interval", "250",
            "--timeout", "800",
            "--history", "42.5",
            "--refresh", "100",
            "--duration", "5",
            "--format", "json",
            "--simulate",
            "--no-color",
            "--verbose",
            "--debug",
        ]);

        assert_eq!(cli.host.as_deref(), Some("example.com"));
        assert_eq!(cli.interval, Some(250));
        assert_eq!(cli.timeout, Some(800));
        assert_eq!(cli.history, Some(42.5));
        assert_eq!(cli.refresh, Some(100));
        assert_eq!(cli.duration, Some(5));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(cli.simulate);
        assert!(cli.no_color);
        assert!(cli.verbose);
        assert!(cli.debug);
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from(["pingplot", "-H", "192.0.2.1", "-i", "10", "-t", "50", "-d", "2"]);
        assert_eq!(cli.host.as_deref(), Some("192.0.2.1"));
        assert_eq!(cli.interval, Some(10));
        assert_eq!(cli.timeout, Some(50));
        assert_eq!(cli.duration, Some(2));
    }

    #[test]
    fn test_interval_range() {
        assert_eq!(parse_interval_ms("0").unwrap(), 0);
        assert_eq!(parse_interval_ms("10000").unwrap(), 10_000);
        assert!(parse_interval_ms("10001").is_err());
        assert!(parse_interval_ms("-1").is_err());
        assert!(parse_interval_ms("+5").is_err());
        assert!(parse_interval_ms("0x10").is_err());
        assert!(parse_interval_ms("").is_err());
        assert!(parse_interval_ms("18446744073709551615").is_err());
    }

    #[test]
    fn test_history_range() {
        assert_eq!(parse_history_seconds("1.0").unwrap(), 1.0);
        assert_eq!(parse_history_seconds("300").unwrap(), 300.0);
        assert!(parse_history_seconds("0.5").is_err());
        assert!(parse_history_seconds("301").is_err());
        assert!(parse_history_seconds("NaN").is_err());
        assert!(parse_history_seconds("inf").is_err());
        assert!(parse_history_seconds("+15").is_err());
    }

    #[test]
    fn test_timeout_refresh_and_duration_ranges() {
        assert!(parse_timeout_ms("0").is_err());
        assert!(parse_timeout_ms("10001").is_err());
        assert_eq!(parse_timeout_ms("1").unwrap(), 1);
        assert!(parse_refresh_ms("5").is_err());
        assert_eq!(parse_refresh_ms("1000").unwrap(), 1000);
        assert!(parse_run_duration("0").is_err());
        assert!(parse_run_duration("86401").is_err());
        assert_eq!(parse_run_duration("60").unwrap(), 60);
    }

    #[test]
    fn test_blank_host_rejected() {
        assert!(Cli::try_parse_from(["pingplot", "--host", "  "]).is_err());
        assert_eq!(parse_host(" example.com ").unwrap(), "example.com");
    }

    #[test]
    fn test_bad_format_rejected() {
        assert!(Cli::try_parse_from(["pingplot", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_cli_validation() {
        let conflict = Cli::parse_from(["pingplot", "--color", "--no-color"]);
        assert!(conflict.validate().unwrap_err().contains("Cannot specify both --color and --no-color"));
        assert!(Cli::parse_from(["pingplot", "--color"]).validate().is_ok());
        assert!(Cli::parse_from(["pingplot"]).validate().is_ok());
    }

    #[test]
    fn test_use_colors_flags() {
        assert!(!Cli::parse_from(["pingplot", "--no-color"]).use_colors());
        assert!(Cli::parse_from(["pingplot", "--color"]).use_colors());
    }

    #[test]
    fn test_color_support_detection() {
        use std::sync::Mutex;
        static MUTEX: Mutex<()> = Mutex::new(());
        let _guard = MUTEX.lock().unwrap();

        std::env::set_var("NO_COLOR", "1");
        assert!(!supports_color());
        std::env::remove_var("NO_COLOR");
    }

    #[test]
    fn test_informational_flags() {
        assert!(Cli::parse_from(["pingplot", "--env-help"]).is_informational());
        let cli = Cli::parse_from(["pingplot", "--write-example-env", "example.env"]);
        assert_eq!(cli.write_example_env, Some(PathBuf::from("example.env")));
        assert!(cli.is_informational());
    }

    #[test]
    fn test_config_summary() {
        let cli = Cli::parse_from(["pingplot", "--host", "example.com", "--interval", "20", "--duration", "3", "--verbose"]);
        let summary = cli.get_config_summary();
        assert!(summary.contains("Host: example.com"));
        assert!(summary.contains("Interval (ms): 20"));
        assert!(summary.contains("Timeout (ms): default"));
        assert!(summary.contains("Run for: 3s"));
        assert!(summary.contains("Verbose mode: true"));
    }
}
