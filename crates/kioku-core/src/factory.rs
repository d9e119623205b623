//! Item Factory
//!
//! Builds new items with safe defaults. Identifiers are derived from the
//! creation instant, a wall-clock salt and an explicit [`IdSequence`], so rapid
//! successive creations never collide and no randomness source is needed.

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

use crate::clock::{Clock, IdSequence, SystemClock};
use crate::fsrs::{INITIAL_DIFFICULTY, INITIAL_STABILITY, Phase};
use crate::memory::{DisplayText, Item};
use crate::policy::{PolicyError, SchedulerPolicy};

/// Creates new items
#[derive(Debug)]
pub struct ItemFactory<C: Clock = SystemClock> {
    clock: C,
    ids: IdSequence,
    policy: SchedulerPolicy,
}

impl Default for ItemFactory<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemFactory<SystemClock> {
    /// Factory on the system clock with the default policy
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> ItemFactory<C> {
    /// Factory on a custom clock with the default policy
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            ids: IdSequence::new(),
            policy: SchedulerPolicy::default(),
        }
    }

    /// Factory on a custom clock with a custom policy
    pub fn with_policy(clock: C, policy: SchedulerPolicy) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self {
            clock,
            ids: IdSequence::new(),
            policy,
        })
    }

    /// Replace the identity sequence (e.g. to resume a persisted counter)
    pub fn with_sequence(mut self, ids: IdSequence) -> Self {
        self.ids = ids;
        self
    }

    /// Identity sequence in use
    pub fn sequence(&self) -> &IdSequence {
        &self.ids
    }

    /// Create a new, immediately due item
    ///
    /// `now` is used as the creation instant when it lies within the
    /// plausibility window of the wall clock; otherwise the wall clock is used.
    pub fn create_new(
        &self,
        word: &str,
        meaning: &str,
        now: Option<DateTime<Utc>>,
        notes: Option<&str>,
    ) -> Item {
        let wall = self.clock.now();
        let window = self.policy.plausibility_window();
        let created = match now {
            Some(t) if (t - wall).abs() <= window => t,
            _ => {
                tracing::debug!(
                    requested = ?now,
                    "Creation instant missing or implausible, using wall clock"
                );
                wall
            }
        }
        .trunc_subsecs(3);

        let id = self.next_id(created, wall);
        let text = DisplayText::normalize(word, meaning, notes, &self.policy);
        tracing::trace!(id = %id, "Item created");

        Item {
            id,
            word: text.word,
            meaning: text.meaning,
            notes: text.notes,
            created_at: Some(created),
            updated_at: Some(created),
            due_at: Some(created),
            phase: Phase::Learning,
            reps: 0,
            lapses: 0,
            stability: INITIAL_STABILITY,
            difficulty: INITIAL_DIFFICULTY,
        }
    }

    /// `created ms (48 bits) | salt (32 bits) | sequence (48 bits)` as a v8 UUID
    fn next_id(&self, created: DateTime<Utc>, wall: DateTime<Utc>) -> String {
        let seq = self.ids.next_value();
        let salt = (wall.timestamp_millis() as u32) ^ wall.timestamp_subsec_nanos();

        let mut bytes = [0u8; 16];
        bytes[..6].copy_from_slice(&(created.timestamp_millis() as u64).to_be_bytes()[2..]);
        bytes[6..10].copy_from_slice(&salt.to_be_bytes());
        bytes[10..].copy_from_slice(&seq.to_be_bytes()[2..]);
        Uuid::new_v8(bytes).hyphenated().to_string()
    }
}

// ============================================================================
// TESTS
// ============================================================================
