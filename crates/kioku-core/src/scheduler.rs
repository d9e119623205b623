//! Review Orchestrator
//!
//! Composes rating normalization, timeline repair, the phase state machine,
//! the memory model and the interval scheduler into the single mutation
//! operation [`Scheduler::review`], plus the four-way [`Scheduler::preview_intervals`].
//!
//! Neither operation mutates its input or fails: corrupted fields are repaired
//! on the way through and the result is always a fresh, valid [`Item`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::fsrs::{
    IntervalInput, MemoryInput, MemoryState, PhaseTransition, Rating, next_interval,
    next_memory_state, transition,
};
use crate::memory::{DisplayText, Item};
use crate::policy::{PolicyError, SchedulerPolicy};
use crate::timeline::{Timeline, add_days};

// ============================================================================
// OUTCOMES
// ============================================================================

/// Result of one review
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    /// The replacement item
    pub item: Item,
    /// Length of the new schedule in days
    pub scheduled_days: f64,
}

/// Schedule lengths (days) each rating would produce, non-decreasing
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreviewIntervals {
    /// Schedule if rated Again
    pub again: f64,
    /// Schedule if rated Hard
    pub hard: f64,
    /// Schedule if rated Good
    pub good: f64,
    /// Schedule if rated Easy
    pub easy: f64,
}

impl PreviewIntervals {
    /// Interval for one rating
    pub fn get(&self, rating: Rating) -> f64 {
        match rating {
            Rating::Again => self.again,
            Rating::Hard => self.hard,
            Rating::Good => self.good,
            Rating::Easy => self.easy,
        }
    }

    /// `(rating, days)` pairs from Again to Easy
    pub fn iter(&self) -> impl Iterator<Item = (Rating, f64)> + '_ {
        Rating::ALL
            .into_iter()
            .map(move |rating| (rating, self.get(rating)))
    }
}

/// One rating applied to a resolved timeline
struct Plan {
    transition: PhaseTransition,
    memory: MemoryState,
    scheduled_days: f64,
}

// ============================================================================
// SCHEDULER
// ============================================================================

/// Spaced repetition scheduler
///
/// Holds the policy and the wall-clock capability. Cheap to construct; hold one
/// per policy.
#[derive(Debug, Clone)]
pub struct Scheduler<C: Clock = SystemClock> {
    clock: C,
    policy: SchedulerPolicy,
}

impl Default for Scheduler<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler<SystemClock> {
    /// Scheduler on the system clock with the default policy
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> Scheduler<C> {
    /// Scheduler on a custom clock with the default policy
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            policy: SchedulerPolicy::default(),
        }
    }

    /// Scheduler on a custom clock with a custom policy
    pub fn with_policy(clock: C, policy: SchedulerPolicy) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self { clock, policy })
    }

    /// Active policy
    pub fn policy(&self) -> &SchedulerPolicy {
        &self.policy
    }

    /// Wall-clock capability
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Apply a rating to an item
    ///
    /// `rating` may be any number; values that are not one of the four ratings
    /// fall back to a phase-safe default. `now` is the requested review instant;
    /// when missing or implausible the wall clock is used instead.
    pub fn review(
        &self,
        item: &Item,
        rating: impl Into<f64>,
        now: Option<DateTime<Utc>>,
    ) -> ReviewOutcome {
        let rating = Rating::normalize(rating.into(), item.phase);
        let timeline = Timeline::resolve(item, now, self.clock.now(), &self.policy);
        let plan = self.plan(item, rating, &timeline);

        let current = timeline.current;
        let due = add_days(current, plan.scheduled_days);
        let text = DisplayText::normalize(
            &item.word,
            &item.meaning,
            item.notes.as_deref(),
            &self.policy,
        );

        tracing::trace!(
            id = %item.id,
            rating = rating.as_str(),
            from = plan.transition.from.as_str(),
            to = plan.transition.to.as_str(),
            lapse = plan.transition.lapse,
            stability = plan.memory.stability,
            difficulty = plan.memory.difficulty,
            scheduled_days = plan.scheduled_days,
            "Review applied"
        );

        ReviewOutcome {
            item: Item {
                id: item.id.clone(),
                word: text.word,
                meaning: text.meaning,
                notes: text.notes,
                created_at: Some(timeline.created_at),
                updated_at: Some(current),
                due_at: Some(due),
                phase: plan.transition.to,
                reps: item.reps.saturating_add(1),
                lapses: item.lapses.saturating_add(u32::from(plan.transition.lapse)),
                stability: plan.memory.stability,
                difficulty: plan.memory.difficulty,
            },
            scheduled_days: plan.scheduled_days,
        }
    }

    /// Schedule lengths all four ratings would produce at `now`
    ///
    /// Computed against one normalized timeline, then smoothed with a running
    /// maximum so Again <= Hard <= Good <= Easy always holds.
    pub fn preview_intervals(&self, item: &Item, now: Option<DateTime<Utc>>) -> PreviewIntervals {
        let timeline = Timeline::resolve(item, now, self.clock.now(), &self.policy);

        let mut floor = 0.0_f64;
        let mut days = [0.0_f64; 4];
        for (slot, rating) in days.iter_mut().zip(Rating::ALL) {
            floor = floor.max(self.plan(item, rating, &timeline).scheduled_days);
            *slot = floor;
        }
        let [again, hard, good, easy] = days;
        PreviewIntervals {
            again,
            hard,
            good,
            easy,
        }
    }

    fn plan(&self, item: &Item, rating: Rating, timeline: &Timeline) -> Plan {
        let elapsed_days = timeline.elapsed_days();
        let scheduled_days = timeline.scheduled_days();
        let transition = transition(item.phase, rating);

        let memory = next_memory_state(
            &MemoryInput {
                stability: item.stability,
                difficulty: item.difficulty,
                rating,
                phase: item.phase,
                elapsed_days,
                scheduled_days,
            },
            &self.policy,
        );

        let next = next_interval(
            &IntervalInput {
                transition,
                rating,
                stability: memory.stability,
                elapsed_days,
                scheduled_days,
                schedule_repaired: timeline.due_repaired,
            },
            &self.policy,
        );

        Plan {
            transition,
            memory,
            scheduled_days: next,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
