//! Delay Resolver Tests
//!
//! Fixed values, bounded ranges, and the lower-bound fallback for inverted ranges.

use deferred::delay::to_duration;
use deferred::{resolve_delay, DelayResolver, DelaySpec};
use proptest::prelude::*;
use rand::rngs::mock::StepRng;
use std::time::Duration;

#[test]
fn test_single_value_is_returned() {
    assert_eq!(resolve_delay(100), 100.0);
}

#[test]
fn test_range_stays_within_bounds() {
    let value = resolve_delay((100, 200));
    assert!(value >= 100.0);
    assert!(value <= 200.0);
}

#[test]
fn test_inverted_range_is_not_swapped() {
    assert_eq!(resolve_delay((200, 100)), 200.0);

    // The random source is never consulted for an inverted range
    let mut resolver = DelayResolver::with_rng(StepRng::new(0, 1));
    for _ in 0..5 {
        assert_eq!(resolver.resolve(DelaySpec::range(200.0, 100.0)), 200.0);
    }
}

#[test]
fn test_negative_value_means_no_delay() {
    assert_eq!(resolve_delay(-100), 0.0);
    assert_eq!(to_duration(resolve_delay(-100), Duration::from_millis(1)), Duration::ZERO);
}

#[test]
fn test_specs_from_json_config() {
    let specs: Vec<DelaySpec> = serde_json::from_str("[250, [100, 200], [200, 100]]").unwrap();
    let mut resolver = DelayResolver::seeded(11);

    assert_eq!(resolver.resolve(specs[0]), 250.0);
    let drawn = resolver.resolve(specs[1]);
    assert!((100.0..=200.0).contains(&drawn));
    assert_eq!(resolver.resolve(specs[2]), 200.0);
}

proptest! {
    #[test]
    fn prop_fixed_value_is_idempotent(value in 0.0f64..1e9) {
        for _ in 0..3 {
            prop_assert_eq!(resolve_delay(value), value);
        }
    }

    #[test]
    fn prop_range_draw_within_bounds(lo in 0.0f64..1e6, width in 0.0f64..1e6, seed: u64) {
        let hi = lo + width;
        let mut resolver = DelayResolver::seeded(seed);
        let value = resolver.resolve((lo, hi));
        prop_assert!(value >= lo && value <= hi, "{} not in [{}, {}]", value, lo, hi);
    }

    #[test]
    fn prop_inverted_range_returns_lower_bound(hi in 0.0f64..1e6, gap in 1.0f64..1e6) {
        let lo = hi + gap;
        prop_assert_eq!(resolve_delay((lo, hi)), lo);
    }

    #[test]
    fn prop_resolved_delay_is_finite_and_non_negative(a: f64, b: f64, fixed: f64) {
        for value in [resolve_delay(fixed), resolve_delay((a, b)), resolve_delay((b, a))] {
            prop_assert!(value.is_finite());
            prop_assert!(value >= 0.0);
        }
    }
}
