//! Scheduler Policy
//!
//! Tunable constants shared by the timeline normalizer, the memory model and
//! the interval scheduler.
//!
//! The outlier window (stability x 12, floor 120 days), the skew tolerance and
//! the one-minute rounding jitter are empirically tuned. They are exposed here
//! so deployments can adjust them, but the defaults should not be changed
//! without review data to back it.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::fsrs::{MAX_STABILITY, MINUTE, Rating};

/// Milliseconds in one day
pub(crate) const MS_PER_DAY: f64 = 86_400_000.0;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Policy validation error
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    /// A numeric field is NaN or infinite
    #[error("Policy field `{field}` must be finite")]
    NonFinite {
        /// Field name (camelCase, as serialized)
        field: &'static str,
    },
    /// A field lies outside its allowed range
    #[error("Policy field `{field}` = {value} is outside [{min}, {max}]")]
    OutOfRange {
        /// Field name (camelCase, as serialized)
        field: &'static str,
        /// Offending value
        value: f64,
        /// Inclusive lower bound
        min: f64,
        /// Inclusive upper bound
        max: f64,
    },
    /// Two fields contradict each other
    #[error("Inconsistent policy: {0}")]
    Inconsistent(String),
}

/// Policy result type
pub type Result<T> = std::result::Result<T, PolicyError>;

// ============================================================================
// POLICY
// ============================================================================

/// Configurable scheduling policy
///
/// Serialized as camelCase JSON. Missing fields take their defaults; unknown
/// fields are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SchedulerPolicy {
    /// Maximum tolerated disagreement between a requested instant and the wall clock (hours)
    pub skew_tolerance_hours: f64,
    /// Timestamps further than this from the wall clock are implausible (years)
    pub plausibility_window_years: f64,
    /// Tolerance used for on-time detection and rounding (minutes)
    pub jitter_minutes: f64,
    /// Review schedules longer than `stability x multiplier` are treated as corrupted
    pub review_outlier_multiplier: f64,
    /// Review schedules up to this length are never treated as corrupted (days)
    pub review_outlier_floor_days: f64,
    /// Absolute maximum schedule length (days)
    pub max_interval_days: f64,
    /// Lower bound for stability, as a fraction of an established review schedule
    pub stability_anchor_ratio: f64,
    /// Review schedules at least this long count as established (days)
    pub stability_anchor_min_days: f64,
    /// Target recall probability when rating Hard
    pub retention_hard: f64,
    /// Target recall probability when rating Good
    pub retention_good: f64,
    /// Target recall probability when rating Easy
    pub retention_easy: f64,
    /// Shortest replacement schedule for a review item with a corrupted due date (days)
    pub repaired_review_min_days: f64,
    /// Longest replacement schedule for a review item with a corrupted due date (days)
    pub repaired_review_max_days: f64,
    /// Maximum length of the `word` field (characters)
    pub word_max_chars: usize,
    /// Maximum length of the `meaning` field (characters)
    pub meaning_max_chars: usize,
    /// Maximum length of the `notes` field (characters)
    pub notes_max_chars: usize,
}

impl Default for SchedulerPolicy {
    fn default() -> Self {
        Self {
            skew_tolerance_hours: 12.0,
            plausibility_window_years: 20.0,
            jitter_minutes: 1.0,
            review_outlier_multiplier: 12.0,
            review_outlier_floor_days: 120.0,
            max_interval_days: MAX_STABILITY,
            stability_anchor_ratio: 0.6,
            stability_anchor_min_days: 7.0,
            retention_hard: 0.95,
            retention_good: 0.9,
            retention_easy: 0.86,
            repaired_review_min_days: 0.5,
            repaired_review_max_days: 7.0,
            word_max_chars: 128,
            meaning_max_chars: 1024,
            notes_max_chars: 4096,
        }
    }
}

impl SchedulerPolicy {
    /// Parse a policy from JSON and validate it
    pub fn from_json(json: &str) -> std::result::Result<Self, PolicyLoadError> {
        let policy: Self = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Check every field against its allowed range
    pub fn validate(&self) -> Result<()> {
        check("skewToleranceHours", self.skew_tolerance_hours, 0.0, 7.0 * 24.0)?;
        check("plausibilityWindowYears", self.plausibility_window_years, 1.0, 1000.0)?;
        check("jitterMinutes", self.jitter_minutes, 0.0, 60.0)?;
        check("reviewOutlierMultiplier", self.review_outlier_multiplier, 1.0, 1000.0)?;
        check("reviewOutlierFloorDays", self.review_outlier_floor_days, 0.5, MAX_STABILITY)?;
        check("maxIntervalDays", self.max_interval_days, 1.0, MAX_STABILITY)?;
        check("stabilityAnchorRatio", self.stability_anchor_ratio, 0.0, 1.0)?;
        check("stabilityAnchorMinDays", self.stability_anchor_min_days, 0.0, MAX_STABILITY)?;
        check("retentionHard", self.retention_hard, 0.5, 0.999)?;
        check("retentionGood", self.retention_good, 0.5, 0.999)?;
        check("retentionEasy", self.retention_easy, 0.5, 0.999)?;
        check("repairedReviewMinDays", self.repaired_review_min_days, 0.5, MAX_STABILITY)?;
        check("repairedReviewMaxDays", self.repaired_review_max_days, 0.5, MAX_STABILITY)?;

        if self.repaired_review_min_days > self.repaired_review_max_days {
            return Err(PolicyError::Inconsistent(format!(
                "repairedReviewMinDays ({}) exceeds repairedReviewMaxDays ({})",
                self.repaired_review_min_days, self.repaired_review_max_days
            )));
        }
        if self.repaired_review_max_days > self.max_interval_days {
            return Err(PolicyError::Inconsistent(format!(
                "repairedReviewMaxDays ({}) exceeds maxIntervalDays ({})",
                self.repaired_review_max_days, self.max_interval_days
            )));
        }
        for (field, value) in [
            ("wordMaxChars", self.word_max_chars),
            ("meaningMaxChars", self.meaning_max_chars),
            ("notesMaxChars", self.notes_max_chars),
        ] {
            if value == 0 {
                return Err(PolicyError::OutOfRange {
                    field,
                    value: 0.0,
                    min: 1.0,
                    max: usize::MAX as f64,
                });
            }
        }
        Ok(())
    }

    /// Skew tolerance as a duration
    pub fn skew_tolerance(&self) -> TimeDelta {
        delta_from_days(self.skew_tolerance_hours / 24.0)
    }

    /// Plausibility window as a duration
    pub fn plausibility_window(&self) -> TimeDelta {
        delta_from_days(self.plausibility_window_years * 365.25)
    }

    /// Rounding / on-time jitter in days
    pub fn jitter_days(&self) -> f64 {
        self.jitter_minutes * MINUTE
    }

    /// Target recall probability for a successful rating
    ///
    /// Again never reaches the continuous formula; it maps to the Good target.
    pub fn desired_retention(&self, rating: Rating) -> f64 {
        match rating {
            Rating::Hard => self.retention_hard,
            Rating::Easy => self.retention_easy,
            Rating::Again | Rating::Good => self.retention_good,
        }
    }

    /// Longest plausible review schedule for an item with the given stability
    pub fn review_outlier_cap(&self, stability: f64) -> f64 {
        let scaled = stability * self.review_outlier_multiplier;
        let scaled = if scaled.is_finite() { scaled } else { 0.0 };
        0.5_f64
            .max(scaled)
            .max(self.review_outlier_floor_days)
            .min(self.max_interval_days)
    }
}

/// Failure to load a policy document
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum PolicyLoadError {
    /// The document is not valid policy JSON
    #[error("Policy parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// The document parsed but a value is unusable
    #[error(transparent)]
    Invalid(#[from] PolicyError),
}

fn check(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(PolicyError::NonFinite { field });
    }
    if value < min || value > max {
        return Err(PolicyError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Convert a (possibly huge or non-finite) day count into a saturating duration
pub(crate) fn delta_from_days(days: f64) -> TimeDelta {
    let ms = (days * MS_PER_DAY).round();
    if ms.is_nan() {
        return TimeDelta::zero();
    }
    // `as` saturates at the i64 bounds, which try_milliseconds may still reject.
    TimeDelta::try_milliseconds(ms as i64).unwrap_or(if ms > 0.0 {
        TimeDelta::MAX
    } else {
        TimeDelta::MIN
    })
}

// ============================================================================
// TESTS
// ============================================================================
