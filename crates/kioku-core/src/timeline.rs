//! Timeline Normalizer
//!
//! Resolves a trustworthy `(created, current, updated, due)` tuple from an
//! item's persisted timestamps and a requested review instant.
//!
//! Persisted timestamps may be missing, unparseable, or skewed by a device
//! with a wrong clock. The wall clock is read once per operation and used only
//! to judge plausibility; a valid requested instant always wins over it.
//!
//! Resolution order:
//! 1. `created`: first valid of created / updated / plausible due / wall,
//!    clamped to at most the earliest known instant plus the skew tolerance
//! 2. `updated`: persisted value or `created`, never before `created`
//! 3. `current`: the requested instant when it agrees with the wall clock and
//!    does not predate `updated`, otherwise the wall clock or `updated`,
//!    truncated to whole milliseconds like every persisted timestamp
//! 4. `due`: the persisted value unless it is missing, not after `updated`,
//!    or outside the phase's floor/cap, in which case a conservative schedule
//!    is substituted

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};

use crate::fsrs::{Phase, sanitize_stability};
use crate::memory::Item;
use crate::policy::{MS_PER_DAY, SchedulerPolicy, delta_from_days};

/// Slack for comparing day counts derived from millisecond timestamps
const DAY_EPSILON: f64 = 1e-9;

/// Normalized timestamps for one review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    /// Resolved creation instant (never after `updated_at` or `current`)
    pub created_at: DateTime<Utc>,
    /// Instant the review is taking place
    pub current: DateTime<Utc>,
    /// Instant of the previous review
    pub updated_at: DateTime<Utc>,
    /// Previous due instant, strictly after `updated_at`
    pub due_at: DateTime<Utc>,
    /// Whether `due_at` had to be replaced
    pub due_repaired: bool,
}

impl Timeline {
    /// Resolve the timeline of `item` for a review requested at `requested`
    ///
    /// `wall` is the wall-clock reading used as the skew oracle. Never fails.
    pub fn resolve(
        item: &Item,
        requested: Option<DateTime<Utc>>,
        wall: DateTime<Utc>,
        policy: &SchedulerPolicy,
    ) -> Self {
        let skew = policy.skew_tolerance();
        let window = policy.plausibility_window();
        let plausible = |t: DateTime<Utc>| (t - wall).abs() <= window;
        let plausible_due = item.due_at.filter(|&t| plausible(t));

        // createdAt
        let mut created = item
            .created_at
            .or(item.updated_at)
            .or(plausible_due)
            .unwrap_or(wall);
        let earliest = [item.updated_at, plausible_due, Some(wall)]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(wall);
        let created_bound = add_delta(earliest, skew);
        if created > created_bound {
            tracing::debug!(id = %item.id, "Creation instant clamped to known timeline");
            created = created_bound;
        }

        // updatedAt
        let updated = item.updated_at.unwrap_or(created).max(created);

        // currentInstant
        let current = match requested {
            Some(r) if (r - wall).abs() <= skew && r >= add_delta(updated, -skew) => {
                r.max(updated)
            }
            _ => {
                let fallback = if updated > add_delta(wall, skew) {
                    wall
                } else {
                    wall.max(updated)
                };
                tracing::debug!(
                    id = %item.id,
                    requested = ?requested,
                    "Requested review instant rejected, using {}",
                    if fallback == wall { "wall clock" } else { "last update" }
                );
                fallback
            }
        };
        let current = current.trunc_subsecs(3);
        let created = created.trunc_subsecs(3).min(current);

        // dueAt
        let (due, due_repaired) = resolve_due(item, updated, policy);

        Self {
            created_at: created,
            current,
            updated_at: updated,
            due_at: due,
            due_repaired,
        }
    }

    /// Days since the previous review (never negative)
    pub fn elapsed_days(&self) -> f64 {
        days_between(self.updated_at, self.current).max(0.0)
    }

    /// Length of the previous schedule in days
    pub fn scheduled_days(&self) -> f64 {
        days_between(self.updated_at, self.due_at)
    }
}

fn resolve_due(
    item: &Item,
    updated: DateTime<Utc>,
    policy: &SchedulerPolicy,
) -> (DateTime<Utc>, bool) {
    let phase = item.phase;
    let floor = phase.min_schedule_days();
    let cap = match phase.max_step_days() {
        Some(step_cap) => step_cap,
        None => policy.review_outlier_cap(sanitize_stability(item.stability)),
    };

    if let Some(due) = item.due_at {
        let scheduled = days_between(updated, due);
        if scheduled > 0.0 && scheduled >= floor - DAY_EPSILON && scheduled <= cap + DAY_EPSILON {
            return (due, false);
        }
        tracing::debug!(
            id = %item.id,
            phase = phase.as_str(),
            scheduled,
            floor,
            cap,
            "Due date outside plausible schedule, repairing"
        );
    } else {
        tracing::debug!(id = %item.id, phase = phase.as_str(), "Missing due date, repairing");
    }

    let replacement = match phase {
        Phase::Review => sanitize_stability(item.stability)
            .clamp(policy.repaired_review_min_days, policy.repaired_review_max_days),
        Phase::Learning | Phase::Relearning => floor,
    };
    (add_days(updated, replacement), true)
}

/// Signed length of `from..to` in days
pub(crate) fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MS_PER_DAY
}

/// `at + days`, saturating at the representable range
pub(crate) fn add_days(at: DateTime<Utc>, days: f64) -> DateTime<Utc> {
    add_delta(at, delta_from_days(days))
}

fn add_delta(at: DateTime<Utc>, delta: TimeDelta) -> DateTime<Utc> {
    at.checked_add_signed(delta).unwrap_or(if delta > TimeDelta::zero() {
        DateTime::<Utc>::MAX_UTC
    } else {
        DateTime::<Utc>::MIN_UTC
    })
}

// ============================================================================
// TESTS
// ============================================================================
