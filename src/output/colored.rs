//! Colored formatter with latency-level color coding

use super::formatter::{format_rate, FormattingOptions, PlainFormatter, ReadoutFields, StatsFormatter};
use crate::{
    error::Result,
    models::LatencyStats,
    stats::format_latency,
    types::PerformanceLevel,
};
use colored::*;
use std::net::IpAddr;
use std::time::Duration;

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub label: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            label: Color::BrightBlack,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self::with_color_scheme(options, ColorScheme::default())
    }

    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        Self {
            plain_formatter: PlainFormatter::new(options.clone()),
            options,
            color_scheme,
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn emphasize(&self, text: ColoredString) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text
        }
    }

    fn label(&self, text: &str) -> ColoredString {
        self.colorize(text, self.color_scheme.label)
    }

    /// Latency value colored by its performance level
    fn latency(&self, text: &str, value_ms: f64) -> ColoredString {
        self.colorize(text, PerformanceLevel::from_latency(value_ms).color())
    }
}

impl StatsFormatter for ColoredFormatter {
    fn format_header(&self, host: &str, target: IpAddr, transport: &str) -> Result<String> {
        let header = self.plain_formatter.format_header(host, target, transport)?;
        if self.options.enable_color {
            Ok(header.color(self.color_scheme.header).bold().to_string())
        } else {
            Ok(header)
        }
    }

    fn format_stats(&self, stats: &LatencyStats) -> Result<String> {
        let Some(summary) = &stats.summary else {
            return Ok(self.colorize("No data", self.color_scheme.muted).to_string());
        };

        let fields = ReadoutFields::from_summary(summary);
        let sep = self.colorize(" | ", self.color_scheme.muted);
        let mut output = format!(
            "{} {}{}{} {}{}{} {}{}{} {}{}{} {}{}{} {} points",
            self.label("Current:"),
            self.emphasize(self.latency(&fields.current, summary.current)),
            sep,
            self.label("Avg:"),
            self.latency(&fields.average, summary.average),
            sep,
            self.label("Max:"),
            self.latency(&fields.max, summary.max),
            sep,
            self.label("Jitter:"),
            fields.jitter,
            sep,
            self.label("Pings per second:"),
            format_rate(stats.rate),
            sep,
            self.label("History:"),
            summary.samples,
        );

        if self.options.verbose_mode {
            let timeouts = summary.timeouts.to_string();
            let timeouts = if summary.timeouts > 0 {
                self.colorize(&timeouts, self.color_scheme.warning)
            } else {
                timeouts.normal()
            };
            output.push_str(&format!(
                "{}{} {} ms{}{} {}{}{} {}{}{} {} ms",
                sep,
                self.label("Min:"),
                format_latency(summary.min),
                sep,
                self.label("Timeouts:"),
                timeouts,
                sep,
                self.label("Capacity:"),
                stats.capacity,
                sep,
                self.label("Scale:"),
                format_latency(stats.display_scale),
            ));
        }

        Ok(output)
    }

    fn format_final_summary(&self, stats: &LatencyStats, total_probes: u64, elapsed: Duration) -> Result<String> {
        let summary = self.plain_formatter.format_final_summary(stats, total_probes, elapsed)?;
        Ok(self.colorize(&summary, self.color_scheme.header).to_string())
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", self.emphasize(self.colorize("WARNING:", self.color_scheme.warning)), warning))
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", self.emphasize(self.colorize("ERROR:", self.color_scheme.error)), error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LatencySummary;

    fn stats() -> LatencyStats {
        LatencyStats {
            summary: Some(LatencySummary {
                current: 420.0,
                average: 35.0,
                min: 10.0,
                max: 420.0,
                jitter: 4.0,
                timeouts: 0,
                samples: 12,
            }),
            rate: 10.0,
            capacity: 150,
            display_scale: 504.0,
        }
    }

    #[test]
    fn test_without_color_matches_plain_text() {
        let options = FormattingOptions { enable_color: false, verbose_mode: false };
        let colored = ColoredFormatter::new(options.clone()).format_stats(&stats()).unwrap();
        let plain = PlainFormatter::new(options).format_stats(&stats()).unwrap();
        assert_eq!(colored, plain);
    }

    #[test]
    fn test_verbose_without_color_matches_plain_text() {
        let options = FormattingOptions { enable_color: false, verbose_mode: true };
        let colored = ColoredFormatter::new(options.clone()).format_stats(&stats()).unwrap();
        let plain = PlainFormatter::new(options).format_stats(&stats()).unwrap();
        assert_eq!(colored, plain);
    }

    #[test]
    fn test_colored_output_contains_values() {
        colored::control::set_override(true);
        let formatter = ColoredFormatter::new(FormattingOptions { enable_color: true, verbose_mode: false });
        let line = formatter.format_stats(&stats()).unwrap();
        assert!(line.contains("420.0 ms"));
        assert!(line.contains("\u{1b}["));
        colored::control::unset_override();
    }

    #[test]
    fn test_warning_prefix() {
        let formatter = ColoredFormatter::new(FormattingOptions { enable_color: false, verbose_mode: false });
        assert_eq!(formatter.format_warning("careful").unwrap(), "WARNING: careful");
        assert_eq!(formatter.format_error("broken").unwrap(), "ERROR: broken");
    }
}
