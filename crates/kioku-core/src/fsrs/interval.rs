//! Interval scheduler
//!
//! Turns an updated memory state and a phase transition into the length of the
//! next schedule, in days.
//!
//! Short-step phases use fixed steps. Graduation uses a fixed short interval
//! instead of the continuous formula. Items staying in review use the
//! retention formula, scaled by rating and review timing, then bounded so that
//! Hard never grows past the previous schedule and Good/Easy never shrink below
//! it when the review was on time or late.

use super::{MINUTE, Phase, PhaseTransition, Rating, interval_for_retention};
use crate::policy::SchedulerPolicy;

/// Timing ratio range used to scale review intervals
const TIMING_RANGE: (f64, f64) = (0.5, 2.5);

/// Interval scale per unit of timing ratio above/below on-time
const TIMING_SLOPE: f64 = 0.1;

/// Inputs to one interval computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalInput {
    /// Phase transition produced by the state machine
    pub transition: PhaseTransition,
    /// Normalized rating
    pub rating: Rating,
    /// Stability after the memory model update
    pub stability: f64,
    /// Days since the previous review
    pub elapsed_days: f64,
    /// Length of the previous schedule (days)
    pub scheduled_days: f64,
    /// Whether the previous due date was corrupted and had to be replaced
    pub schedule_repaired: bool,
}

/// Next schedule length in days
///
/// Always within `[floor of the next phase, policy.max_interval_days]`.
///
/// Hard is capped at the previous schedule whether the review is early, on
/// time or late. An early Hard therefore keeps the previous schedule rather
/// than shortening it; only Again shortens a review schedule.
pub fn next_interval(input: &IntervalInput, policy: &SchedulerPolicy) -> f64 {
    let to = input.transition.to;
    let days = match (input.transition.from, to) {
        (_, Phase::Learning) => learning_step(input.rating),
        (_, Phase::Relearning) => relearning_step(input.rating),
        (Phase::Review, Phase::Review) => review_interval(input, policy),
        (_, Phase::Review) => graduation_interval(input.rating),
    };

    let floor = to.min_schedule_days();
    if days.is_finite() {
        days.clamp(floor, policy.max_interval_days.max(floor))
    } else {
        floor
    }
}

fn learning_step(rating: Rating) -> f64 {
    match rating {
        Rating::Again => MINUTE,
        Rating::Hard => 5.0 * MINUTE,
        Rating::Good | Rating::Easy => 10.0 * MINUTE,
    }
}

fn relearning_step(rating: Rating) -> f64 {
    match rating {
        Rating::Again => 10.0 * MINUTE,
        Rating::Hard => 15.0 * MINUTE,
        Rating::Good => 0.5,
        Rating::Easy => 1.0,
    }
}

fn graduation_interval(rating: Rating) -> f64 {
    match rating {
        Rating::Easy => 1.0,
        _ => 0.5,
    }
}

fn review_interval(input: &IntervalInput, policy: &SchedulerPolicy) -> f64 {
    let jitter = policy.jitter_days();
    let floor = Phase::Review.min_schedule_days();
    let max = policy.max_interval_days;
    let previous = if input.scheduled_days.is_finite() {
        input.scheduled_days.clamp(floor, max)
    } else {
        floor
    };
    let elapsed = if input.elapsed_days.is_finite() {
        input.elapsed_days.max(0.0)
    } else {
        0.0
    };

    let base = interval_for_retention(input.stability, policy.desired_retention(input.rating));
    let rating_scale = match input.rating {
        Rating::Hard => 0.85,
        Rating::Easy => 1.15,
        Rating::Again | Rating::Good => 1.0,
    };
    let timing_ratio = (elapsed / previous.max(MINUTE)).clamp(TIMING_RANGE.0, TIMING_RANGE.1);
    let timing_scale = 1.0 + (timing_ratio - 1.0) * TIMING_SLOPE;

    let raw = base * rating_scale * timing_scale;
    let raw = if raw.is_finite() { raw.clamp(floor, max) } else { previous };

    let on_time_or_late = elapsed + jitter >= previous;
    let lower = match input.rating {
        Rating::Good | Rating::Easy if on_time_or_late => Some(previous),
        _ => None,
    };
    let upper = if input.rating == Rating::Hard || input.schedule_repaired {
        Some(previous)
    } else {
        None
    };

    let days = bounded_quantize(raw, lower, upper, jitter);
    tracing::trace!(
        rating = input.rating.as_str(),
        base,
        timing_ratio,
        previous,
        days,
        "Review interval computed"
    );
    days.clamp(floor, max)
}

/// Round a schedule onto the day / half-day grid
///
/// Day-scale schedules round to whole days; sub-day schedules to half days.
/// `jitter` (days) is added before rounding so values sitting just below a
/// rounding boundary because of timestamp noise round the same way as values
/// exactly on it.
pub fn quantize_days(days: f64, jitter: f64) -> f64 {
    let step = grid_step(days, jitter);
    (((days + jitter) / step).round() * step).max(0.5)
}

fn grid_step(days: f64, jitter: f64) -> f64 {
    if days >= 1.0 - jitter { 1.0 } else { 0.5 }
}

fn snap_down(days: f64, jitter: f64) -> f64 {
    let step = grid_step(days, jitter);
    (((days + jitter) / step).floor() * step).max(0.5)
}

fn snap_up(days: f64, jitter: f64) -> f64 {
    let step = grid_step(days, jitter);
    (((days - jitter) / step).ceil() * step).max(0.5)
}

/// Quantize, then keep the result within the optional bounds (the upper bound wins)
fn bounded_quantize(days: f64, lower: Option<f64>, upper: Option<f64>, jitter: f64) -> f64 {
    let mut q = quantize_days(days, jitter);
    if let Some(lo) = lower {
        if q < lo - jitter {
            q = snap_up(lo, jitter);
        }
    }
    if let Some(hi) = upper {
        if q > hi + jitter {
            q = snap_down(hi, jitter);
        }
    }
    q
}

// ============================================================================
// TESTS
// ============================================================================
