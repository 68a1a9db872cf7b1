//! Output formatting for the live readout
//!
//! Text formatters produce a single status line that is redrawn in place;
//! the JSON formatter produces one record per line.

mod colored;
mod formatter;
mod json;

pub use colored::{ColorScheme, ColoredFormatter};
pub use formatter::{FormattingOptions, PlainFormatter, StatsFormatter};
pub use json::JsonFormatter;

use crate::models::{Config, OutputFormat};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Formatter for the configured output format and color preference
    pub fn create_formatter(config: &Config) -> Box<dyn StatsFormatter> {
        match config.format {
            OutputFormat::Json => Box::new(JsonFormatter::new(config.verbose)),
            OutputFormat::Text => {
                let options = FormattingOptions {
                    enable_color: config.enable_color,
                    verbose_mode: config.verbose,
                };
                if config.enable_color {
                    Box::new(ColoredFormatter::new(options))
                } else {
                    Box::new(PlainFormatter::new(options))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_picks_formatter() {
        let json = Config { format: OutputFormat::Json, ..Config::default() };
        assert!(!OutputFormatterFactory::create_formatter(&json).is_live());

        let text = Config { enable_color: false, ..Config::default() };
        let formatter = OutputFormatterFactory::create_formatter(&text);
        assert!(formatter.is_live());
        assert_eq!(formatter.format_warning("x").unwrap(), "WARNING: x");
        assert!(!formatter.format_error("boom").unwrap().contains('\u{1b}'));
    }
}
