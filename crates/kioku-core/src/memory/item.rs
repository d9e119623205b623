//! Item - the reviewable unit
//!
//! One vocabulary entry plus its scheduling state. Items are never mutated by
//! the engine: [`crate::Scheduler::review`] returns a fresh value that replaces
//! the old one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;
use crate::fsrs::{INITIAL_DIFFICULTY, INITIAL_STABILITY, Phase, retrievability, sanitize_stability};
use crate::policy::MS_PER_DAY;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Failure to read a serialized item record
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The payload is not JSON at all
    #[error("Record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The payload is JSON but not an object
    #[error("Record must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Record result type
pub type Result<T> = std::result::Result<T, RecordError>;

// ============================================================================
// ITEM
// ============================================================================

/// A reviewable vocabulary item
///
/// Field values read from storage may be corrupted (invalid timestamps,
/// non-finite reals, oversized text). They are carried as-is and repaired by
/// the scheduler on the next review; see [`crate::timeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    /// Unique identifier
    #[serde(deserialize_with = "lenient::text")]
    pub id: String,
    /// Front of the card
    #[serde(deserialize_with = "lenient::text")]
    pub word: String,
    /// Back of the card
    #[serde(deserialize_with = "lenient::text")]
    pub meaning: String,
    /// Optional free-form notes
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_text"
    )]
    pub notes: Option<String>,

    /// Creation instant (`None` when the stored value was unreadable)
    #[serde(with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    /// Instant of the last review
    #[serde(with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Instant the item becomes due
    #[serde(with = "lenient::timestamp")]
    pub due_at: Option<DateTime<Utc>>,

    // ========== Scheduling state ==========
    /// Current learning phase
    #[serde(deserialize_with = "lenient::phase")]
    pub phase: Phase,
    /// Reviews recorded so far
    #[serde(deserialize_with = "lenient::counter")]
    pub reps: u32,
    /// Failed recalls while in review
    #[serde(deserialize_with = "lenient::counter")]
    pub lapses: u32,
    /// Memory stability in days
    #[serde(deserialize_with = "lenient::real")]
    pub stability: f64,
    /// Item difficulty (1-10)
    #[serde(deserialize_with = "lenient::real")]
    pub difficulty: f64,
}

impl Default for Item {
    fn default() -> Self {
        Self {
            id: String::new(),
            word: String::new(),
            meaning: String::new(),
            notes: None,
            created_at: None,
            updated_at: None,
            due_at: None,
            phase: Phase::Learning,
            reps: 0,
            lapses: 0,
            stability: INITIAL_STABILITY,
            difficulty: INITIAL_DIFFICULTY,
        }
    }
}

impl Item {
    /// Read an item from a JSON record, coercing corrupted field values
    ///
    /// Only payloads that are not a JSON object fail.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let kind = match &value {
            serde_json::Value::Object(_) => return Ok(serde_json::from_value(value)?),
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "a boolean",
            serde_json::Value::Number(_) => "a number",
            serde_json::Value::String(_) => "a string",
            serde_json::Value::Array(_) => "an array",
        };
        Err(RecordError::NotAnObject(kind))
    }

    /// Serialize to the canonical record shape
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Whether the item is due at `at`
    ///
    /// Items with an unreadable due date count as due so they get repaired.
    pub fn is_due(&self, at: DateTime<Utc>) -> bool {
        self.due_at.is_none_or(|due| due <= at)
    }

    /// Estimated probability of recall at `at`
    ///
    /// Measured from the last review; an item never reviewed successfully
    /// (or with unreadable timestamps) reports from `at` itself, i.e. 1.0.
    pub fn retrievability_at(&self, at: DateTime<Utc>) -> f64 {
        let elapsed_days = self
            .updated_at
            .map(|updated| (at - updated).num_milliseconds() as f64 / MS_PER_DAY)
            .unwrap_or(0.0);
        retrievability(sanitize_stability(self.stability), elapsed_days)
    }
}

// ============================================================================
// TESTS
// ============================================================================
