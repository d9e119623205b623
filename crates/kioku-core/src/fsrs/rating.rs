//! Review ratings and their normalization

use serde::{Deserialize, Serialize};

use super::Phase;

/// Maximum distance from an integer for a raw rating to count as that integer
const RATING_TOLERANCE: f64 = 1e-4;

/// Recall quality reported by the learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    /// Forgot
    Again = 1,
    /// Recalled with serious effort
    Hard = 2,
    /// Recalled
    Good = 3,
    /// Recalled effortlessly
    Easy = 4,
}

impl Rating {
    /// All ratings in ascending order
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Strict conversion from the ordinal value
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Rating::Again),
            2 => Some(Rating::Hard),
            3 => Some(Rating::Good),
            4 => Some(Rating::Easy),
            _ => None,
        }
    }

    /// Ordinal value (1-4)
    pub fn value(self) -> i32 {
        self as i32
    }

    /// Whether this rating counts as a successful recall
    pub fn is_pass(self) -> bool {
        self >= Rating::Good
    }

    /// Lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }

    /// Safe rating for garbage input in the given phase.
    ///
    /// Review items default to Good so corrupted input never records a lapse;
    /// learning and relearning items default to Again so it never graduates them.
    pub fn fallback_for(phase: Phase) -> Self {
        match phase {
            Phase::Review => Rating::Good,
            Phase::Learning | Phase::Relearning => Rating::Again,
        }
    }

    /// Coerce an arbitrary raw value into a valid rating. Never fails.
    ///
    /// Non-finite values, values further than 1e-4 from an integer, and
    /// integers outside 1..=4 map to [`Rating::fallback_for`]. Everything else
    /// rounds to the nearest integer.
    pub fn normalize(raw: f64, phase: Phase) -> Self {
        let rounded = raw.round();
        let valid = raw.is_finite()
            && (raw - rounded).abs() <= RATING_TOLERANCE
            && (1.0..=4.0).contains(&rounded);

        if !valid {
            let fallback = Self::fallback_for(phase);
            tracing::debug!(
                raw,
                phase = phase.as_str(),
                fallback = fallback.as_str(),
                "Invalid rating replaced with phase-safe default"
            );
            return fallback;
        }

        // Range-checked above, so the cast and lookup always succeed.
        Self::from_i32(rounded as i32).unwrap_or_else(|| Self::fallback_for(phase))
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> f64 {
        rating.value() as f64
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Rating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "again" | "1" => Ok(Rating::Again),
            "hard" | "2" => Ok(Rating::Hard),
            "good" | "3" => Ok(Rating::Good),
            "easy" | "4" => Ok(Rating::Easy),
            _ => Err(format!("Unknown rating: {}", s)),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
