//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::Result,
    models::Config,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Build the configuration: defaults, then `.env`, then the environment,
    /// then CLI flags, then validation
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        EnvManager::load_env_file(self.cli.debug)?;
        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Build the configuration without touching the process environment
    pub fn parse_cli_only(&self) -> Result<Config> {
        let mut config = Config::default();
        self.apply_cli_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        if let Some(ref host) = cli.host {
            config.host = host.clone();
        }
        if let Some(interval) = cli.interval {
            config.interval_ms = interval;
        }
        if let Some(timeout) = cli.timeout {
            config.timeout_ms = timeout;
        }
        if let Some(history) = cli.history {
            config.history_seconds = history;
        }
        if let Some(refresh) = cli.refresh {
            config.refresh_ms = refresh;
        }
        if let Some(format) = cli.format {
            config.format = format;
        }

        if cli.no_color {
            config.enable_color = false;
        } else if cli.color {
            config.enable_color = true;
        }

        // CLI-only switches
        config.simulate = cli.simulate;
        config.verbose = cli.verbose;
        config.debug = cli.debug;

        if config.debug {
            eprintln!("Applied CLI overrides to configuration");
            eprintln!("{}", display_config_summary(config));
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Host: {}", config.host));
    summary.push(format!("Interval: {} ms", config.interval_ms));
    summary.push(format!("Timeout: {} ms", config.timeout_ms));
    summary.push(format!("History: {:.1} s", config.history_seconds));
    summary.push(format!("Refresh: {} ms", config.refresh_ms));
    summary.push(format!("Output: {:?}", config.format));
    summary.push(format!("Simulated: {}", config.simulate));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
