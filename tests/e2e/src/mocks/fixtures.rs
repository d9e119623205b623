//! Test Data Factory
//!
//! Provides utilities for generating realistic test data:
//! - Fresh and mature items with chosen scheduling state
//! - Corrupted records for adversarial suites
//! - A [`Journey`] driver that replays a learner's reviews on a fixed clock

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use kioku_core::{FixedClock, Item, ItemFactory, Phase, Rating, ReviewOutcome, Scheduler};

/// Base instant shared by every suite
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

/// Scheduler whose wall clock reads `at`
pub fn scheduler_at(at: DateTime<Utc>) -> Scheduler<FixedClock> {
    Scheduler::with_clock(FixedClock::new(at))
}

/// Review `item` at `at`, with the wall clock agreeing
pub fn review_at(item: &Item, rating: Rating, at: DateTime<Utc>) -> ReviewOutcome {
    scheduler_at(at).review(item, rating, Some(at))
}

/// Factory for creating test data
pub struct TestDataFactory;

impl TestDataFactory {
    // ========================================================================
    // SINGLE ITEM CREATION
    // ========================================================================

    /// A brand-new item created at `at`
    pub fn fresh_item(word: &str, meaning: &str, at: DateTime<Utc>) -> Item {
        ItemFactory::with_clock(FixedClock::new(at)).create_new(word, meaning, Some(at), None)
    }

    /// A review-phase item last reviewed at `updated` and scheduled `scheduled_days` ahead
    pub fn mature_item(
        updated: DateTime<Utc>,
        stability: f64,
        difficulty: f64,
        reps: u32,
        scheduled_days: i64,
    ) -> Item {
        Item {
            id: format!("mature-{reps}"),
            word: "勉強".to_string(),
            meaning: "study".to_string(),
            notes: None,
            created_at: Some(updated - TimeDelta::days(365)),
            updated_at: Some(updated),
            due_at: Some(updated + TimeDelta::days(scheduled_days)),
            phase: Phase::Review,
            reps,
            lapses: 1,
            stability,
            difficulty,
        }
    }

    // ========================================================================
    // BATCH CREATION
    // ========================================================================

    /// `count` fresh items created one second apart from one factory
    pub fn create_batch(count: usize) -> Vec<Item> {
        let factory = ItemFactory::with_clock(FixedClock::new(t0()));
        (0..count)
            .map(|i| {
                let at = t0() + TimeDelta::seconds(i as i64);
                factory.create_new(&format!("word {i}"), &format!("meaning {i}"), Some(at), None)
            })
            .collect()
    }

    // ========================================================================
    // CORRUPTED RECORDS
    // ========================================================================

    /// Named JSON records with one or more corrupted fields
    pub fn corrupted_records() -> Vec<(&'static str, String)> {
        vec![
            (
                "unparseable due",
                r#"{"id":"c1","word":"w","meaning":"m","createdAt":"2025-01-01T00:00:00Z","updatedAt":"2025-03-01T09:00:00Z","dueAt":"not-a-date","phase":"review","reps":5,"lapses":0,"stability":120,"difficulty":5}"#.to_string(),
            ),
            (
                "everything null",
                r#"{"id":null,"word":null,"meaning":null,"createdAt":null,"updatedAt":null,"dueAt":null,"phase":null,"reps":null,"lapses":null,"stability":null,"difficulty":null}"#.to_string(),
            ),
            ("empty object", "{}".to_string()),
            (
                "huge numbers",
                r#"{"id":"c3","word":"w","meaning":"m","createdAt":"2025-01-01T00:00:00Z","updatedAt":"2025-03-01T09:00:00Z","dueAt":"2025-03-02T09:00:00Z","phase":"review","reps":1e300,"lapses":1e300,"stability":1e300,"difficulty":-1e300}"#.to_string(),
            ),
            (
                "far future timestamps",
                r#"{"id":"c4","word":"w","meaning":"m","createdAt":"2199-01-01T00:00:00Z","updatedAt":"2199-01-01T00:00:00Z","dueAt":"2199-06-01T00:00:00Z","phase":"relearning","reps":3,"lapses":1,"stability":2,"difficulty":5}"#.to_string(),
            ),
            (
                "ancient epoch timestamps",
                r#"{"id":"c5","word":"w","meaning":"m","createdAt":0,"updatedAt":0,"dueAt":0,"phase":"learning","reps":0,"lapses":0,"stability":0.5,"difficulty":5}"#.to_string(),
            ),
            (
                "due before update",
                r#"{"id":"c6","word":"w","meaning":"m","createdAt":"2025-02-01T00:00:00Z","updatedAt":"2025-03-01T09:00:00Z","dueAt":"2025-02-20T00:00:00Z","phase":"review","reps":9,"lapses":0,"stability":10,"difficulty":5}"#.to_string(),
            ),
            (
                "wrong types",
                r#"{"id":["x"],"word":{"a":1},"meaning":true,"notes":42,"createdAt":true,"updatedAt":[1],"dueAt":{},"phase":7,"reps":"many","lapses":"-3","stability":"slow","difficulty":[]}"#.to_string(),
            ),
            (
                "invisible text",
                "{\"id\":\"c8\",\"word\":\"\u{200B}\u{FEFF}\",\"meaning\":\"\u{00A0} \u{2060}\",\"notes\":\"\\r\\n\\r\\n\",\"phase\":\"Review\",\"stability\":-5,\"difficulty\":11}".to_string(),
            ),
        ]
    }

    /// Corrupted records parsed into items
    pub fn corrupted_items() -> Vec<(&'static str, Item)> {
        Self::corrupted_records()
            .into_iter()
            .map(|(name, json)| {
                let item = Item::from_json(&json)
                    .unwrap_or_else(|e| panic!("fixture `{name}` must parse: {e}"));
                (name, item)
            })
            .collect()
    }
}

// ============================================================================
// JOURNEY DRIVER
// ============================================================================

/// Replays a sequence of reviews, advancing a simulated clock
#[derive(Debug, Clone)]
pub struct Journey {
    /// Current version of the item
    pub item: Item,
    /// Simulated current instant
    pub now: DateTime<Utc>,
    /// Every schedule length produced so far
    pub history: Vec<f64>,
}

impl Journey {
    /// Create an item at [`t0`] and start the journey there
    pub fn start(word: &str, meaning: &str) -> Self {
        Self {
            item: TestDataFactory::fresh_item(word, meaning, t0()),
            now: t0(),
            history: Vec::new(),
        }
    }

    /// Start from an existing item at `now`
    pub fn resume(item: Item, now: DateTime<Utc>) -> Self {
        Self {
            item,
            now,
            history: Vec::new(),
        }
    }

    /// Review right when the item falls due
    pub fn review_when_due(&mut self, rating: Rating) -> ReviewOutcome {
        if let Some(due) = self.item.due_at {
            self.now = self.now.max(due);
        }
        self.review_now(rating)
    }

    /// Wait `delta`, then review
    pub fn review_after(&mut self, delta: TimeDelta, rating: Rating) -> ReviewOutcome {
        self.now += delta;
        self.review_now(rating)
    }

    fn review_now(&mut self, rating: Rating) -> ReviewOutcome {
        let outcome = review_at(&self.item, rating, self.now);
        self.item = outcome.item.clone();
        self.history.push(outcome.scheduled_days);
        outcome
    }
}
