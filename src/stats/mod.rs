//! Live statistics over a snapshot of the rolling window
//!
//! Everything here is a pure function of its inputs. The only state that
//! survives between polls is the display scale, which the caller owns and
//! feeds back in.

use crate::defaults::INITIAL_DISPLAY_SCALE;
use crate::models::{LatencyStats, LatencySummary, Sample};

/// Grow the scale when the window max exceeds it by this factor of headroom
const SCALE_HEADROOM: f64 = 1.2;
/// Shrink only once the max falls below this fraction of the scale
const SCALE_SHRINK_THRESHOLD: f64 = 0.7;
/// Per-poll decay applied while shrinking
const SCALE_DECAY: f64 = 0.95;
const SCALE_FLOOR: f64 = 1.0;

/// Upper bound a consumer should plot against, with hysteresis so the axis
/// does not jump on every poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayScale(f64);

impl DisplayScale {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Scale after observing a window whose maximum is `max`.
    ///
    /// The decay is applied once per call, so how fast the axis settles
    /// depends on how often the consumer polls.
    pub fn next(self, max: f64) -> Self {
        let scale = self.0;
        if max > scale {
            Self(max * SCALE_HEADROOM)
        } else if max < scale * SCALE_SHRINK_THRESHOLD {
            Self((scale * SCALE_DECAY).max(max * SCALE_HEADROOM).max(SCALE_FLOOR))
        } else {
            self
        }
    }
}

impl Default for DisplayScale {
    fn default() -> Self {
        Self(INITIAL_DISPLAY_SCALE)
    }
}

/// Computes window metrics from an immutable snapshot
pub struct StatsComputer;

impl StatsComputer {
    /// Statistics for `samples` (oldest first).
    ///
    /// An empty window yields no summary and leaves the scale unchanged.
    pub fn compute(samples: &[Sample], capacity: usize, rate: f64, previous_scale: DisplayScale) -> LatencyStats {
        let summary = Self::summarize(samples);
        let display_scale = match &summary {
            Some(summary) => previous_scale.next(summary.max),
            None => previous_scale,
        };

        LatencyStats {
            summary,
            rate,
            capacity,
            display_scale: display_scale.value(),
        }
    }

    /// Window metrics, or `None` for an empty window
    pub fn summarize(samples: &[Sample]) -> Option<LatencySummary> {
        let current = samples.last()?.value_ms;
        let count = samples.len();

        // Single pass for sum, min, max and timeout count
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut timeouts = 0;
        for sample in samples {
            sum += sample.value_ms;
            min = min.min(sample.value_ms);
            max = max.max(sample.value_ms);
            if sample.timed_out {
                timeouts += 1;
            }
        }

        let average = sum / count as f64;
        Some(LatencySummary {
            current,
            average,
            min,
            max,
            jitter: population_std_dev(samples, average),
            timeouts,
            samples: count,
        })
    }
}

/// Population standard deviation (divides by N); zero for fewer than two samples
pub fn population_std_dev(samples: &[Sample], mean: f64) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let sum_squared_diff: f64 = samples
        .iter()
        .map(|s| {
            let diff = s.value_ms - mean;
            diff * diff
        })
        .sum();
    (sum_squared_diff / samples.len() as f64).sqrt()
}

/// Render a latency in milliseconds: three decimals below 1 ms, one above
pub fn format_latency(value_ms: f64) -> String {
    if value_ms < 1.0 {
        format!("{:.3}", value_ms)
    } else {
        format!("{:.1}", value_ms)
    }
}

#[cfg(test)]
mod comprehensive_tests;
