//! A single latency measurement

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One entry of the rolling history.
///
/// A probe that got no reply is stored with `value_ms` equal to the session
/// timeout and `timed_out` set, so statistics treat it as a very slow reply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub value_ms: f64,
    #[serde(default)]
    pub timed_out: bool,
}

impl Sample {
    pub fn reply(value_ms: f64) -> Self {
        Self { value_ms, timed_out: false }
    }

    pub fn from_elapsed(elapsed: Duration) -> Self {
        Self::reply(elapsed.as_secs_f64() * 1000.0)
    }

    /// Sentinel recorded for a failed or expired probe
    pub fn timeout(timeout: Duration) -> Self {
        Self {
            value_ms: timeout.as_secs_f64() * 1000.0,
            timed_out: true,
        }
    }
}
