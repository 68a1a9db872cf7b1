//! Statistics handed to the presentation layer on every poll

use crate::models::Sample;
use serde::{Deserialize, Serialize};

/// Metrics over the samples currently held in the rolling window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    /// Most recent sample
    pub current: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation of the window
    pub jitter: f64,
    /// Samples recorded as timeouts
    pub timeouts: usize,
    pub samples: usize,
}

/// Output of one statistics pass.
///
/// `summary` is `None` when the window is empty; rate, capacity and scale are
/// reported either way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    pub summary: Option<LatencySummary>,
    /// Completed probes per second
    pub rate: f64,
    pub capacity: usize,
    pub display_scale: f64,
}

impl LatencyStats {
    pub fn has_data(&self) -> bool {
        self.summary.is_some()
    }

    /// Number of samples in the window the stats were computed from
    pub fn points(&self) -> usize {
        self.summary.map(|s| s.samples).unwrap_or(0)
    }
}

/// Snapshot plus statistics returned by `Controller::poll`
#[derive(Debug, Clone, Serialize)]
pub struct PollResult {
    pub samples: Vec<Sample>,
    pub stats: LatencyStats,
    /// Buffer generation the snapshot was taken at
    pub generation: u64,
}
