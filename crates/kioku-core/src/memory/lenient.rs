//! Lenient field deserializers
//!
//! Records arrive from storage that may have been edited by hand or passed
//! through lossy bridges. Each field is read as a raw JSON value and coerced
//! here, once, into the typed value the engine works with. Nothing in this
//! module fails on a well-formed JSON value.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

use crate::fsrs::Phase;

// ============================================================================
// TIMESTAMPS
// ============================================================================

/// Format an instant in canonical form: millisecond precision, `Z` suffix
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a persisted timestamp string, truncated to millisecond precision
///
/// Accepts RFC 3339 with any offset, or a bare `YYYY-MM-DDTHH:MM:SS[.fff]`
/// which is read as UTC. Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = DateTime::parse_from_rfc3339(trimmed)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })?;
    Some(parsed.trunc_subsecs(3))
}

fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => {
            let ms = n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.abs() < 9.0e15)
                    .map(|f| f.round() as i64)
            })?;
            DateTime::from_timestamp_millis(ms)
        }
        _ => None,
    }
}

/// `Option<DateTime<Utc>>` as a canonical string; unparseable input reads as `None`
pub(crate) mod timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(at) => serializer.serialize_str(&format_timestamp(*at)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let parsed = timestamp_from_value(&raw);
        if parsed.is_none() && !raw.is_null() {
            tracing::debug!(raw = %raw, "Unparseable timestamp read as invalid");
        }
        Ok(parsed)
    }
}

// ============================================================================
// COUNTERS
// ============================================================================

/// Coerce a raw numeric counter into a non-negative integer
///
/// +inf and values beyond `u32::MAX` saturate; NaN and negatives reset to 0;
/// fractions are floored.
pub fn normalize_counter(raw: f64) -> u32 {
    if raw.is_nan() || raw <= 0.0 {
        0
    } else if raw >= u32::MAX as f64 {
        u32::MAX
    } else {
        raw.floor() as u32
    }
}

pub(crate) fn counter<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    let count = match &raw {
        Value::Number(n) => match (n.as_u64(), n.as_i64()) {
            (Some(u), _) => u32::try_from(u).unwrap_or(u32::MAX),
            (None, Some(_)) => 0,
            (None, None) => normalize_counter(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => normalize_counter(s.trim().parse::<f64>().unwrap_or(f64::NAN)),
        _ => 0,
    };
    Ok(count)
}

// ============================================================================
// REALS, PHASE, TEXT
// ============================================================================

/// Numbers or numeric strings; anything else is NaN for the memory model to repair
pub(crate) fn real<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(match &raw {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

pub(crate) fn phase<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Phase, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(match &raw {
        Value::String(s) => Phase::parse_name(s),
        _ => Phase::Learning,
    })
}

fn text_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(text_from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

pub(crate) fn optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(text_from_value(Value::deserialize(deserializer)?))
}

// ============================================================================
// TESTS
// ============================================================================
