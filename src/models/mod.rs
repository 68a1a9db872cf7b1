//! Data models shared by the monitor core and its consumers

pub mod config;
pub mod sample;
pub mod stats;

pub use config::{Config, OutputFormat, SessionConfig};
pub use sample::Sample;
pub use stats::{LatencyStats, LatencySummary, PollResult};
