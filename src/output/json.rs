//! JSON lines output for scripts and log collectors

use super::formatter::StatsFormatter;
use crate::{
    error::Result,
    models::{LatencyStats, PollResult, Sample},
};
use serde::Serialize;
use std::net::IpAddr;
use std::time::Duration;

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Record<'a> {
    SessionStart {
        timestamp: String,
        host: &'a str,
        target: String,
        transport: &'a str,
    },
    Stats {
        timestamp: String,
        generation: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        latest: Option<Sample>,
        stats: &'a LatencyStats,
        #[serde(skip_serializing_if = "Option::is_none")]
        samples: Option<&'a [Sample]>,
    },
    Summary {
        timestamp: String,
        total_probes: u64,
        elapsed_ms: u128,
        stats: &'a LatencyStats,
    },
    Warning {
        timestamp: String,
        message: &'a str,
    },
    Error {
        timestamp: String,
        message: &'a str,
    },
}

/// One JSON object per line
pub struct JsonFormatter {
    include_samples: bool,
}

impl JsonFormatter {
    /// `include_samples` embeds the whole window in every stats record
    pub fn new(include_samples: bool) -> Self {
        Self { include_samples }
    }

    fn timestamp() -> String {
        chrono::Utc::now().to_rfc3339()
    }

    fn render(record: &Record<'_>) -> Result<String> {
        Ok(serde_json::to_string(record)?)
    }
}

impl StatsFormatter for JsonFormatter {
    fn format_header(&self, host: &str, target: IpAddr, transport: &str) -> Result<String> {
        Self::render(&Record::SessionStart {
            timestamp: Self::timestamp(),
            host,
            target: target.to_string(),
            transport,
        })
    }

    fn format_stats(&self, stats: &LatencyStats) -> Result<String> {
        Self::render(&Record::Stats {
            timestamp: Self::timestamp(),
            generation: None,
            latest: None,
            stats,
            samples: None,
        })
    }

    fn format_poll(&self, poll: &PollResult) -> Result<String> {
        Self::render(&Record::Stats {
            timestamp: Self::timestamp(),
            generation: Some(poll.generation),
            latest: poll.samples.last().copied(),
            stats: &poll.stats,
            samples: self.include_samples.then_some(poll.samples.as_slice()),
        })
    }

    fn format_final_summary(&self, stats: &LatencyStats, total_probes: u64, elapsed: Duration) -> Result<String> {
        Self::render(&Record::Summary {
            timestamp: Self::timestamp(),
            total_probes,
            elapsed_ms: elapsed.as_millis(),
            stats,
        })
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Self::render(&Record::Warning { timestamp: Self::timestamp(), message: warning })
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Self::render(&Record::Error { timestamp: Self::timestamp(), message: error })
    }

    fn is_live(&self) -> bool {
        false
    }
}
