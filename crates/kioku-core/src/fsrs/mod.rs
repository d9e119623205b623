//! FSRS-style scheduling module
//!
//! Continuous memory-strength model combined with a discrete phase state machine.
//!
//! ## Core Formulas:
//! - Retrievability: R = (1 + F * t / S)^D with F = 19/81, D = -0.5
//! - Interval: t = S/F * (R^(1/D) - 1)
//!
//! ## Pipeline
//! 1. [`Rating::normalize`] coerces raw input into one of four ratings, phase-aware
//! 2. [`transition`] decides the next [`Phase`] and whether a lapse is recorded
//! 3. [`next_memory_state`] updates stability and difficulty
//! 4. [`next_interval`] turns the new memory state into a schedule length

mod algorithm;
mod interval;
mod phase;
mod rating;

pub use algorithm::{
    difficulty_factor,
    effective_previous_stability,
    interval_for_retention,
    next_difficulty,
    next_memory_state,
    next_stability,
    // Core functions
    retrievability,
    sanitize_difficulty,
    sanitize_stability,
    MemoryInput,
    MemoryState,
    // Constants
    DECAY,
    FACTOR,
    INITIAL_DIFFICULTY,
    INITIAL_STABILITY,
    MAX_DIFFICULTY,
    MAX_STABILITY,
    MINUTE,
    MIN_DIFFICULTY,
    MIN_STABILITY,
};

pub use interval::{next_interval, quantize_days, IntervalInput};

pub use phase::{transition, Phase, PhaseTransition};

pub use rating::Rating;
