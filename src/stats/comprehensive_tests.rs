//! Property-based tests for window statistics and the display scale

use super::{DisplayScale, StatsComputer};
use crate::models::Sample;
use proptest::collection::vec;
use proptest::prelude::*;

/// Property-based test generators
mod generators {
    use super::*;

    /// Latencies from sub-millisecond LAN replies up to a 10 s timeout
    pub fn latencies() -> impl Strategy<Value = f64> {
        0.001f64..10_000.0
    }

    pub fn windows() -> impl Strategy<Value = Vec<Sample>> {
        vec((latencies(), any::<bool>()), 1..500)
            .prop_map(|pairs| pairs.into_iter().map(|(v, timed_out)| Sample { value_ms: v, timed_out }).collect())
    }

    pub fn scales() -> impl Strategy<Value = f64> {
        1.0f64..20_000.0
    }
}

proptest! {
    #[test]
    fn average_between_min_and_max(samples in generators::windows()) {
        let summary = StatsComputer::summarize(&samples).unwrap();
        let tolerance = 1e-9 * summary.max.max(1.0);
        prop_assert!(summary.min <= summary.average + tolerance);
        prop_assert!(summary.average <= summary.max + tolerance);
        prop_assert_eq!(summary.samples, samples.len());
        prop_assert_eq!(summary.current, samples[samples.len() - 1].value_ms);
    }

    #[test]
    fn jitter_non_negative_and_bounded(samples in generators::windows()) {
        let summary = StatsComputer::summarize(&samples).unwrap();
        prop_assert!(summary.jitter >= 0.0);
        // a population std dev never exceeds half the range
        prop_assert!(summary.jitter <= (summary.max - summary.min) / 2.0 + 1e-6);
    }

    #[test]
    fn timeouts_counted(samples in generators::windows()) {
        let summary = StatsComputer::summarize(&samples).unwrap();
        prop_assert_eq!(summary.timeouts, samples.iter().filter(|s| s.timed_out).count());
    }

    #[test]
    fn scale_always_covers_max_after_growth(scale in generators::scales(), max in generators::latencies()) {
        let next = DisplayScale::new(scale).next(max);
        if max > scale {
            prop_assert!(next.value() > max);
        }
        prop_assert!(next.value() >= 1.0);
    }

    #[test]
    fn scale_never_shrinks_below_max(scale in generators::scales(), max in generators::latencies()) {
        let next = DisplayScale::new(scale).next(max);
        prop_assert!(next.value() >= max);
    }

    #[test]
    fn empty_window_keeps_scale(scale in generators::scales(), capacity in 100usize..10_000, rate in 0.0f64..5000.0) {
        let stats = StatsComputer::compute(&[], capacity, rate, DisplayScale::new(scale));
        prop_assert!(stats.summary.is_none());
        prop_assert_eq!(stats.display_scale, scale);
        prop_assert_eq!(stats.capacity, capacity);
    }
}

#[test]
fn test_repeated_polls_converge_toward_headroom() {
    let mut scale = DisplayScale::new(1000.0);
    for _ in 0..200 {
        scale = scale.next(10.0);
    }
    // decay stops once the scale is inside the hysteresis band
    assert!(scale.value() >= 12.0);
    assert!(scale.value() <= 10.0 / 0.7);
}
