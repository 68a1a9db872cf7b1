//! Type definitions shared across the probing pipeline

use colored::Color;
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Lifecycle of the background probing task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProberState {
    /// No probing task exists
    Idle,
    /// The probing task is issuing probes
    Running,
    /// Stop was requested and the task is finishing its current probe
    Stopping,
}

impl ProberState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
        }
    }
}

impl std::fmt::Display for ProberState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single echo request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// A matching echo reply arrived before the deadline
    Reply,
    /// No matching reply arrived before the deadline
    TimedOut,
    /// The request could not be sent or the network reported an error
    Unreachable(String),
}

impl ProbeOutcome {
    pub fn is_reply(&self) -> bool {
        matches!(self, Self::Reply)
    }
}

/// Latency classification used to colour the readout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceLevel {
    Excellent, // < 50ms
    Good,      // 50-100ms
    Fair,      // 100-300ms
    Poor,      // 300-1000ms
    VeryPoor,  // >= 1000ms
}

impl PerformanceLevel {
    pub fn from_latency(latency_ms: f64) -> Self {
        if latency_ms < 50.0 {
            Self::Excellent
        } else if latency_ms < 100.0 {
            Self::Good
        } else if latency_ms < 300.0 {
            Self::Fair
        } else if latency_ms < 1000.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::VeryPoor => Color::Red,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_performance_level_thresholds() {
        assert_eq!(PerformanceLevel::from_latency(0.2), PerformanceLevel::Excellent);
        assert_eq!(PerformanceLevel::from_latency(50.0), PerformanceLevel::Good);
        assert_eq!(PerformanceLevel::from_latency(299.9), PerformanceLevel::Fair);
        assert_eq!(PerformanceLevel::from_latency(300.0), PerformanceLevel::Poor);
        assert_eq!(PerformanceLevel::from_latency(1000.0), PerformanceLevel::VeryPoor);
    }

    #[test]
    fn test_prober_state_display() {
        assert_eq!(ProberState::Running.to_string(), "running");
        assert_eq!(ProberState::Idle.as_str(), "idle");
    }

    #[test]
    fn test_outcome_is_reply() {
        assert!(ProbeOutcome::Reply.is_reply());
        assert!(!ProbeOutcome::TimedOut.is_reply());
        assert!(!ProbeOutcome::Unreachable("no route".into()).is_reply());
    }
}
