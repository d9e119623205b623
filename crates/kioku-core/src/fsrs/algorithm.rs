//! Memory model
//!
//! Stability and difficulty updates. Every function here is total: inputs are
//! sanitized first, and any intermediate result that stops being finite falls
//! back to the previous (clamped) value.

use super::{Phase, Rating};
use crate::policy::SchedulerPolicy;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Forgetting curve factor (F = 19/81, so that R(S) = 0.9)
pub const FACTOR: f64 = 19.0 / 81.0;

/// Forgetting curve exponent
pub const DECAY: f64 = -0.5;

/// One minute, in days
pub const MINUTE: f64 = 1.0 / 1440.0;

/// Minimum stability (days)
pub const MIN_STABILITY: f64 = 0.1;

/// Maximum stability (days), also the absolute schedule cap
pub const MAX_STABILITY: f64 = 36500.0;

/// Minimum difficulty
pub const MIN_DIFFICULTY: f64 = 1.0;

/// Maximum difficulty
pub const MAX_DIFFICULTY: f64 = 10.0;

/// Stability of a freshly created item
pub const INITIAL_STABILITY: f64 = 0.5;

/// Difficulty of a freshly created item
pub const INITIAL_DIFFICULTY: f64 = 5.0;

/// Difficulty pulls toward this value on every counted review
const DIFFICULTY_MEAN: f64 = 5.0;

/// Strength of the pull toward [`DIFFICULTY_MEAN`]
const DIFFICULTY_REVERSION: f64 = 0.08;

/// Timing ratio range for review items
const REVIEW_TIMING_RANGE: (f64, f64) = (0.5, 2.5);

/// Timing ratio range for relearning items
const RELEARNING_TIMING_RANGE: (f64, f64) = (0.8, 1.6);

// ============================================================================
// SANITIZATION
// ============================================================================

/// Clamp a persisted stability into bounds; non-finite becomes the initial value
pub fn sanitize_stability(stability: f64) -> f64 {
    if stability.is_finite() {
        stability.clamp(MIN_STABILITY, MAX_STABILITY)
    } else {
        INITIAL_STABILITY
    }
}

/// Clamp a persisted difficulty into bounds; non-finite becomes the initial value
pub fn sanitize_difficulty(difficulty: f64) -> f64 {
    if difficulty.is_finite() {
        difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
    } else {
        INITIAL_DIFFICULTY
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

// ============================================================================
// CORE FUNCTIONS
// ============================================================================

/// Probability of recall after `elapsed_days` for an item with `stability`
///
/// R = (1 + F * t / S)^D, clamped to [0, 1]. Degenerate stability yields 0.
pub fn retrievability(stability: f64, elapsed_days: f64) -> f64 {
    if !stability.is_finite() || stability <= 0.0 {
        return 0.0;
    }
    let elapsed = if elapsed_days.is_finite() {
        elapsed_days.max(0.0)
    } else if elapsed_days > 0.0 {
        return 0.0;
    } else {
        0.0
    };
    finite_or((1.0 + FACTOR * elapsed / stability).powf(DECAY), 0.0).clamp(0.0, 1.0)
}

/// Days until recall probability decays to `retention`
///
/// t = S/F * (R^(1/D) - 1)
pub fn interval_for_retention(stability: f64, retention: f64) -> f64 {
    let retention = retention.clamp(0.0001, 0.9999);
    stability / FACTOR * (retention.powf(1.0 / DECAY) - 1.0)
}

/// Scale applied to stability growth: easier items grow faster
pub fn difficulty_factor(difficulty: f64) -> f64 {
    (11.0 - sanitize_difficulty(difficulty)) / 10.0
}

/// Next difficulty after a review
///
/// Failed learning and relearning steps leave difficulty unchanged so short
/// retries do not permanently harden the item.
pub fn next_difficulty(difficulty: f64, rating: Rating, phase: Phase) -> f64 {
    let previous = sanitize_difficulty(difficulty);
    if phase != Phase::Review && matches!(rating, Rating::Again | Rating::Hard) {
        return previous;
    }

    let shift = match rating {
        Rating::Easy => -0.45,
        Rating::Good => -0.1,
        Rating::Hard => 0.15,
        Rating::Again => 0.6,
    };
    let reversion = DIFFICULTY_REVERSION * (DIFFICULTY_MEAN - previous);

    finite_or(previous + shift + reversion, previous).clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// Seed stability for an item that has no memory-strength history yet
fn learning_seed(rating: Rating) -> f64 {
    match rating {
        Rating::Again => MIN_STABILITY,
        Rating::Hard => 0.3,
        Rating::Good => 1.0,
        Rating::Easy => 2.4,
    }
}

/// Stability floor for items with an already-established review schedule
///
/// A persisted stability implausibly small relative to a long review schedule is
/// anchored up to `ratio x schedule`, so one corrupted value cannot collapse
/// the item on its next review.
pub fn effective_previous_stability(
    stability: f64,
    phase: Phase,
    scheduled_days: f64,
    policy: &SchedulerPolicy,
) -> f64 {
    let stability = sanitize_stability(stability);
    if phase != Phase::Review
        || !scheduled_days.is_finite()
        || scheduled_days < policy.stability_anchor_min_days
    {
        return stability;
    }

    let anchor = (scheduled_days * policy.stability_anchor_ratio).min(MAX_STABILITY);
    if stability < anchor {
        tracing::debug!(
            stability,
            anchor,
            scheduled_days,
            "Stability anchored to established review schedule"
        );
        anchor
    } else {
        stability
    }
}

/// Next stability after a review
///
/// `stability` must already be the effective previous stability. `phase` is the
/// phase *before* the review.
pub fn next_stability(
    stability: f64,
    difficulty: f64,
    rating: Rating,
    phase: Phase,
    elapsed_days: f64,
    scheduled_days: f64,
) -> f64 {
    let previous = sanitize_stability(stability);

    if phase == Phase::Learning {
        return learning_seed(rating);
    }

    let elapsed = finite_or(elapsed_days, 0.0).max(0.0);
    let scheduled = finite_or(scheduled_days, MINUTE).max(MINUTE);
    let r = retrievability(previous, elapsed);
    let d_factor = difficulty_factor(difficulty);
    let (lo, hi) = if phase == Phase::Review {
        REVIEW_TIMING_RANGE
    } else {
        RELEARNING_TIMING_RANGE
    };
    let timing_ratio = finite_or(elapsed / scheduled, 1.0).clamp(lo, hi);

    let next = match rating {
        Rating::Again => {
            let forget_penalty = 0.12 + 0.22 * d_factor;
            let overdue_penalty = 1.0 + (timing_ratio - 1.0).max(0.0) * 0.25;
            previous * forget_penalty / overdue_penalty
        }
        Rating::Hard => {
            let grown = previous * (1.0 + 0.12 * (1.0 - r) * d_factor * timing_ratio);
            (previous + 0.05).max(grown)
        }
        Rating::Good | Rating::Easy => {
            let gain = if rating == Rating::Easy { 0.9 } else { 0.62 };
            let grown = previous * (1.0 + gain * (1.0 - r) * d_factor * timing_ratio);
            (previous + 0.1).max(grown)
        }
    };

    finite_or(next, previous).clamp(MIN_STABILITY, MAX_STABILITY)
}

// ============================================================================
// MEMORY STATE
// ============================================================================

/// Inputs to one memory model update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryInput {
    /// Persisted stability (may be corrupted)
    pub stability: f64,
    /// Persisted difficulty (may be corrupted)
    pub difficulty: f64,
    /// Normalized rating
    pub rating: Rating,
    /// Phase before the review
    pub phase: Phase,
    /// Days since the previous review
    pub elapsed_days: f64,
    /// Length of the previous schedule (days)
    pub scheduled_days: f64,
}

/// Stability and difficulty after a review
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryState {
    /// Days until recall probability decays to 90%
    pub stability: f64,
    /// Item difficulty (1-10)
    pub difficulty: f64,
}

/// Run the full memory model update
pub fn next_memory_state(input: &MemoryInput, policy: &SchedulerPolicy) -> MemoryState {
    let previous = effective_previous_stability(
        input.stability,
        input.phase,
        input.scheduled_days,
        policy,
    );

    MemoryState {
        stability: next_stability(
            previous,
            input.difficulty,
            input.rating,
            input.phase,
            input.elapsed_days,
            input.scheduled_days,
        ),
        difficulty: next_difficulty(input.difficulty, input.rating, input.phase),
    }
}

// ============================================================================
// TESTS
// ============================================================================
