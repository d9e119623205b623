//! Extreme Value Tests
//!
//! Numerical edge cases of the memory model and the interval grid, driven
//! through the public API.

use chrono::TimeDelta;
use kioku_core::fsrs::quantize_days;
use kioku_core::{
    MAX_STABILITY, MIN_STABILITY, Phase, Rating, SchedulerPolicy, interval_for_retention,
    retrievability,
};
use kioku_e2e_tests::{TestDataFactory, review_at, t0};

const JITTER: f64 = 1.0 / 1440.0;

// ============================================================================
// RETRIEVABILITY
// ============================================================================

#[test]
fn test_retrievability_is_certain_at_zero_elapsed() {
    for stability in [MIN_STABILITY, 1.0, 42.0, MAX_STABILITY] {
        assert_eq!(retrievability(stability, 0.0), 1.0);
        assert_eq!(retrievability(stability, -5.0), 1.0);
    }
}

#[test]
fn test_retrievability_is_ninety_percent_after_one_stability() {
    for stability in [0.5, 3.0, 120.0] {
        let r = retrievability(stability, stability);
        assert!((r - 0.9).abs() < 1e-12, "S={stability}: R={r}");
    }
}

#[test]
fn test_retrievability_degenerate_inputs_stay_in_unit_range() {
    let cases = [
        (f64::NAN, 1.0),
        (0.0, 1.0),
        (-3.0, 1.0),
        (f64::INFINITY, 1.0),
        (1.0, f64::INFINITY),
        (1.0, f64::NAN),
        (1e-300, 1e300),
    ];
    for (stability, elapsed) in cases {
        let r = retrievability(stability, elapsed);
        assert!((0.0..=1.0).contains(&r), "S={stability} t={elapsed}: R={r}");
    }
    assert_eq!(retrievability(f64::NAN, 1.0), 0.0);
    assert_eq!(retrievability(1.0, f64::INFINITY), 0.0);
}

#[test]
fn test_item_retrievability_decays_with_time() {
    let item = TestDataFactory::mature_item(t0(), 10.0, 5.0, 4, 10);
    let fresh = item.retrievability_at(t0());
    let later = item.retrievability_at(t0() + TimeDelta::days(10));
    let much_later = item.retrievability_at(t0() + TimeDelta::days(1_000));
    assert_eq!(fresh, 1.0);
    assert!((later - 0.9).abs() < 1e-9);
    assert!(much_later < later);
}

// ============================================================================
// RETENTION TARGETS
// ============================================================================

#[test]
fn test_interval_for_ninety_percent_equals_stability() {
    for stability in [0.1, 1.0, 7.5, 365.0] {
        let days = interval_for_retention(stability, 0.9);
        assert!((days - stability).abs() < 1e-9 * stability.max(1.0));
    }
}

#[test]
fn test_stricter_retention_means_shorter_interval() {
    let policy = SchedulerPolicy::default();
    let hard = interval_for_retention(20.0, policy.desired_retention(Rating::Hard));
    let good = interval_for_retention(20.0, policy.desired_retention(Rating::Good));
    let easy = interval_for_retention(20.0, policy.desired_retention(Rating::Easy));
    assert!(hard < good && good < easy, "{hard} {good} {easy}");
}

#[test]
fn test_retention_extremes_are_clamped() {
    assert!(interval_for_retention(10.0, 1.0).is_finite());
    assert!(interval_for_retention(10.0, 0.0).is_finite());
    assert!(interval_for_retention(10.0, 1.0) > 0.0);
}

// ============================================================================
// INTERVAL GRID
// ============================================================================

#[test]
fn test_quantize_snaps_to_half_days_below_one_day() {
    assert_eq!(quantize_days(0.1, JITTER), 0.5);
    assert_eq!(quantize_days(0.3, JITTER), 0.5);
    assert_eq!(quantize_days(0.74, JITTER), 0.5);
    assert_eq!(quantize_days(0.76, JITTER), 1.0);
}

#[test]
fn test_quantize_snaps_to_whole_days_from_one_day() {
    assert_eq!(quantize_days(10.2, JITTER), 10.0);
    assert_eq!(quantize_days(10.6, JITTER), 11.0);
    assert_eq!(quantize_days(0.9995, JITTER), 1.0);
}

// ============================================================================
// SCHEDULE CEILING
// ============================================================================

#[test]
fn test_max_stability_item_stays_within_ceiling() {
    let item = TestDataFactory::mature_item(t0(), MAX_STABILITY, 1.0, 200, 3_650);
    let due = t0() + TimeDelta::days(3_650);
    for rating in [Rating::Hard, Rating::Good, Rating::Easy] {
        let outcome = review_at(&item, rating, due);
        assert!(outcome.scheduled_days <= MAX_STABILITY, "{rating}");
        assert!(outcome.item.stability <= MAX_STABILITY);
        assert_eq!(outcome.item.phase, Phase::Review);
    }
}

#[test]
fn test_min_stability_item_still_gets_half_day() {
    let item = TestDataFactory::mature_item(t0(), MIN_STABILITY, 10.0, 2, 1);
    let outcome = review_at(&item, Rating::Hard, t0() + TimeDelta::days(1));
    assert!(outcome.scheduled_days >= 0.5);
    assert!(outcome.item.stability >= MIN_STABILITY);
}
