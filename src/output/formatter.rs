//! Core formatting trait and the plain text implementation

use crate::{
    error::{AppError, Result},
    models::{LatencyStats, LatencySummary, PollResult},
    stats::format_latency,
};
use std::fmt::Write as _;
use std::net::IpAddr;
use std::time::Duration;

/// Renders what the controller reports into lines for the terminal
pub trait StatsFormatter: Send {
    /// Banner printed once a session has started
    fn format_header(&self, host: &str, target: IpAddr, transport: &str) -> Result<String>;

    /// One live readout line
    fn format_stats(&self, stats: &LatencyStats) -> Result<String>;

    /// Readout for a full poll; formats only the statistics by default
    fn format_poll(&self, poll: &PollResult) -> Result<String> {
        self.format_stats(&poll.stats)
    }

    /// Closing summary after the session stops
    fn format_final_summary(&self, stats: &LatencyStats, total_probes: u64, elapsed: Duration) -> Result<String>;

    fn format_warning(&self, warning: &str) -> Result<String>;

    fn format_error(&self, error: &str) -> Result<String>;

    /// Whether each readout replaces the previous one on the same line
    fn is_live(&self) -> bool {
        true
    }
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    pub enable_color: bool,
    /// Append min, timeout count and display scale to each readout
    pub verbose_mode: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
        }
    }
}

/// The readout fields, shared by the text formatters
pub(crate) struct ReadoutFields {
    pub current: String,
    pub average: String,
    pub max: String,
    pub jitter: String,
}

impl ReadoutFields {
    pub fn from_summary(summary: &LatencySummary) -> Self {
        Self {
            current: format!("{} ms", format_latency(summary.current)),
            average: format!("{} ms", format_latency(summary.average)),
            max: format!("{} ms", format_latency(summary.max)),
            jitter: format!("{} ms", format_latency(summary.jitter)),
        }
    }
}

pub(crate) fn format_rate(rate: f64) -> String {
    format!("{:.1}", rate)
}

/// Plain text formatter
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    fn fmt_error(e: std::fmt::Error) -> AppError {
        AppError::io(format!("Failed to format output: {}", e))
    }
}

impl StatsFormatter for PlainFormatter {
    fn format_header(&self, host: &str, target: IpAddr, transport: &str) -> Result<String> {
        let title = if host == target.to_string() {
            format!("Probing {} ({})", host, transport)
        } else {
            format!("Probing {} [{}] ({})", host, target, transport)
        };
        let border = "=".repeat(title.len() + 4);

        let mut output = String::new();
        writeln!(output, "{}", border).map_err(Self::fmt_error)?;
        writeln!(output, "  {}  ", title).map_err(Self::fmt_error)?;
        write!(output, "{}", border).map_err(Self::fmt_error)?;
        Ok(output)
    }

    fn format_stats(&self, stats: &LatencyStats) -> Result<String> {
        let Some(summary) = &stats.summary else {
            return Ok("No data".to_string());
        };

        let fields = ReadoutFields::from_summary(summary);
        let mut output = String::new();
        write!(
            output,
            "Current: {} | Avg: {} | Max: {} | Jitter: {} | Pings per second: {} | History: {} points",
            fields.current,
            fields.average,
            fields.max,
            fields.jitter,
            format_rate(stats.rate),
            summary.samples
        )
        .map_err(Self::fmt_error)?;

        if self.options.verbose_mode {
            write!(
                output,
                " | Min: {} ms | Timeouts: {} | Capacity: {} | Scale: {} ms",
                format_latency(summary.min),
                summary.timeouts,
                stats.capacity,
                format_latency(stats.display_scale)
            )
            .map_err(Self::fmt_error)?;
        }

        Ok(output)
    }

    fn format_final_summary(&self, stats: &LatencyStats, total_probes: u64, elapsed: Duration) -> Result<String> {
        let mut output = String::new();
        writeln!(output, "Sent {} probes in {:.1} s", total_probes, elapsed.as_secs_f64()).map_err(Self::fmt_error)?;

        match &stats.summary {
            Some(summary) => {
                let loss = if summary.samples > 0 {
                    summary.timeouts as f64 / summary.samples as f64 * 100.0
                } else {
                    0.0
                };
                write!(
                    output,
                    "Last {} samples: min/avg/max/jitter = {}/{}/{}/{} ms, {:.1}% timed out",
                    summary.samples,
                    format_latency(summary.min),
                    format_latency(summary.average),
                    format_latency(summary.max),
                    format_latency(summary.jitter),
                    loss
                )
                .map_err(Self::fmt_error)?;
            }
            None => write!(output, "No data").map_err(Self::fmt_error)?,
        }

        Ok(output)
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }
}
