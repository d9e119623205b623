//! Learning phases and the phase state machine
//!
//! ```text
//!   learning   --(Good/Easy)--> review
//!   relearning --(Good/Easy)--> review
//!   review     --(Again)------> relearning   (lapse)
//! ```
//!
//! Every other (phase, rating) pair stays where it is. Failed learning and
//! relearning steps are short retries and never count as lapses.

use serde::{Deserialize, Serialize};

use super::{MINUTE, Rating};

/// Discrete learning stage of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Not yet graduated; minute-scale steps
    #[default]
    Learning,
    /// Graduated; day-scale intervals from the memory model
    Review,
    /// Lapsed from review; minute-scale steps back to review
    Relearning,
}

impl Phase {
    /// All phases
    pub const ALL: [Phase; 3] = [Phase::Learning, Phase::Review, Phase::Relearning];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Learning => "learning",
            Phase::Review => "review",
            Phase::Relearning => "relearning",
        }
    }

    /// Parse from string name; anything unrecognised is `Learning`
    pub fn parse_name(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "learning" => Phase::Learning,
            "review" => Phase::Review,
            "relearning" => Phase::Relearning,
            _ => Phase::Learning,
        }
    }

    /// Shortest schedule (days) an item in this phase may carry
    pub fn min_schedule_days(&self) -> f64 {
        match self {
            Phase::Learning => MINUTE,
            Phase::Relearning => 10.0 * MINUTE,
            Phase::Review => 0.5,
        }
    }

    /// Longest plausible schedule (days) for a short-step phase.
    ///
    /// Review has no fixed cap: see [`crate::SchedulerPolicy::review_outlier_cap`].
    pub fn max_step_days(&self) -> Option<f64> {
        match self {
            Phase::Learning => Some(1.0),
            Phase::Relearning => Some(2.0),
            Phase::Review => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of running the phase state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    /// Phase before the review
    pub from: Phase,
    /// Phase after the review
    pub to: Phase,
    /// Whether a lapse is recorded
    pub lapse: bool,
}

impl PhaseTransition {
    /// Moving from learning or relearning into review
    pub fn is_graduation(&self) -> bool {
        self.from != Phase::Review && self.to == Phase::Review
    }
}

/// Decide the next phase for a rating
pub fn transition(from: Phase, rating: Rating) -> PhaseTransition {
    let to = match from {
        Phase::Learning if rating.is_pass() => Phase::Review,
        Phase::Learning => Phase::Learning,
        Phase::Relearning if rating.is_pass() => Phase::Review,
        Phase::Relearning => Phase::Relearning,
        Phase::Review if rating == Rating::Again => Phase::Relearning,
        Phase::Review => Phase::Review,
    };

    PhaseTransition {
        from,
        to,
        lapse: from == Phase::Review && rating == Rating::Again,
    }
}

// ============================================================================
// TESTS
// ============================================================================
