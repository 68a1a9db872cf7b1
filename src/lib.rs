//! PingPlot
//!
//! A continuous latency monitor. A background task probes one host with ICMP
//! echo requests, keeps a rolling history whose length adapts to the measured
//! probe rate, and exposes snapshots plus live statistics for a consumer that
//! polls on its own cadence.

pub mod app;
pub mod buffer;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod prober;
pub mod rate;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use buffer::SampleBuffer;
pub use controller::Controller;
pub use error::{AppError, Result};
pub use models::{Config, LatencyStats, LatencySummary, PollResult, Sample, SessionConfig};
pub use prober::Prober;
pub use rate::RateEstimator;
pub use stats::{DisplayScale, StatsComputer};
pub use types::{ProbeOutcome, ProberState};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values and accepted ranges
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_HOST: &str = "1.1.1.1";
    pub const DEFAULT_INTERVAL_MS: u64 = 0;
    pub const DEFAULT_TIMEOUT_MS: u64 = 1000;
    pub const DEFAULT_HISTORY_SECONDS: f64 = 15.0;
    pub const DEFAULT_REFRESH_MS: u64 = 33;
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    pub const MIN_INTERVAL_MS: i64 = 0;
    pub const MAX_INTERVAL_MS: i64 = 10_000;
    pub const MIN_TIMEOUT_MS: u64 = 1;
    pub const MAX_TIMEOUT_MS: u64 = 10_000;
    pub const MIN_HISTORY_SECONDS: f64 = 1.0;
    pub const MAX_HISTORY_SECONDS: f64 = 300.0;
    pub const MIN_REFRESH_MS: u64 = 10;
    pub const MAX_REFRESH_MS: u64 = 1000;

    /// History capacity before the first rate recompute of a session
    pub const INITIAL_CAPACITY: usize = 500;
    pub const MIN_CAPACITY: usize = 100;
    pub const MAX_CAPACITY: usize = 10_000;

    /// Minimum wall-clock time between rate recomputes
    pub const RATE_WINDOW: Duration = Duration::from_millis(1000);

    /// Display scale before any data has been seen, in milliseconds
    pub const INITIAL_DISPLAY_SCALE: f64 = 100.0;
}
