//! # Learn / Review / Lapse Journey Tests
//!
//! Full learner workflows from creation through graduation, growth, lapse and
//! recovery, checking the item invariants after every step.

use chrono::TimeDelta;
use kioku_core::{Item, MAX_DIFFICULTY, MAX_STABILITY, MIN_DIFFICULTY, MIN_STABILITY, Phase, Rating};
use kioku_e2e_tests::{Journey, scheduler_at};

fn assert_minutes(days: f64, minutes: f64) {
    assert!((days - minutes / 1440.0).abs() < 1e-12, "{days} days is not {minutes} min");
}

fn assert_valid(item: &Item) {
    let created = item.created_at.expect("created_at");
    let updated = item.updated_at.expect("updated_at");
    let due = item.due_at.expect("due_at");
    assert!(created <= updated, "created {created} > updated {updated}");
    assert!(updated < due, "updated {updated} >= due {due}");
    assert!((MIN_STABILITY..=MAX_STABILITY).contains(&item.stability));
    assert!((MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&item.difficulty));
}

// ============================================================================
// LEARNING
// ============================================================================

#[test]
fn test_failed_learning_steps_are_short_retries() {
    let mut journey = Journey::start("水", "water");

    let again = journey.review_after(TimeDelta::zero(), Rating::Again);
    assert_eq!(again.item.phase, Phase::Learning);
    assert_minutes(again.scheduled_days, 1.0);
    assert_eq!(again.item.lapses, 0);
    assert_eq!(again.item.difficulty, 5.0);

    let hard = journey.review_when_due(Rating::Hard);
    assert_eq!(hard.item.phase, Phase::Learning);
    assert_minutes(hard.scheduled_days, 5.0);
    assert_eq!(hard.item.difficulty, 5.0);
    assert_eq!(hard.item.stability, 0.3);

    let good = journey.review_when_due(Rating::Good);
    assert_eq!(good.item.phase, Phase::Review);
    assert_eq!(good.scheduled_days, 0.5);
    assert_eq!(good.item.reps, 3);
    assert_valid(&good.item);
}

#[test]
fn test_easy_graduates_to_one_day() {
    let mut journey = Journey::start("火", "fire");
    let easy = journey.review_after(TimeDelta::zero(), Rating::Easy);
    assert_eq!(easy.item.phase, Phase::Review);
    assert_eq!(easy.scheduled_days, 1.0);
    assert_eq!(easy.item.stability, 2.4);
}

// ============================================================================
// REVIEW GROWTH
// ============================================================================

#[test]
fn test_on_time_good_reviews_never_shrink() {
    let mut journey = Journey::start("山", "mountain");
    journey.review_after(TimeDelta::zero(), Rating::Good);
    for _ in 0..15 {
        let outcome = journey.review_when_due(Rating::Good);
        assert_eq!(outcome.item.phase, Phase::Review);
        assert_valid(&outcome.item);
    }
    assert!(
        journey.history.windows(2).all(|w| w[1] >= w[0]),
        "{:?}",
        journey.history
    );
    assert!(*journey.history.last().unwrap() >= 1.0);
    assert_eq!(journey.item.reps, 16);
}

#[test]
fn test_easy_path_outpaces_good_path() {
    let mut good = Journey::start("川", "river");
    let mut easy = Journey::start("川", "river");
    good.review_after(TimeDelta::zero(), Rating::Good);
    easy.review_after(TimeDelta::zero(), Rating::Good);

    for _ in 0..8 {
        good.review_when_due(Rating::Good);
        easy.review_when_due(Rating::Easy);
    }
    let good_total: f64 = good.history.iter().sum();
    let easy_total: f64 = easy.history.iter().sum();
    assert!(easy_total >= good_total, "easy {easy_total} < good {good_total}");
    assert!(easy.item.stability >= good.item.stability);
}

#[test]
fn test_review_intervals_land_on_grid() {
    let mut journey = Journey::start("空", "sky");
    journey.review_after(TimeDelta::zero(), Rating::Easy);
    for rating in [Rating::Good, Rating::Easy, Rating::Hard, Rating::Good, Rating::Easy] {
        let outcome = journey.review_when_due(rating);
        let days = outcome.scheduled_days;
        assert_eq!((days * 2.0).fract(), 0.0, "{rating}: {days}");
        if days >= 1.0 {
            assert_eq!(days.fract(), 0.0, "{rating}: {days}");
        }
    }
}

// ============================================================================
// LAPSE AND RECOVERY
// ============================================================================

#[test]
fn test_lapse_and_relearn() {
    let mut journey = Journey::start("海", "sea");
    journey.review_after(TimeDelta::zero(), Rating::Good);
    for _ in 0..4 {
        journey.review_when_due(Rating::Good);
    }
    let before = journey.item.clone();

    let lapse = journey.review_when_due(Rating::Again);
    assert_eq!(lapse.item.phase, Phase::Relearning);
    assert_eq!(lapse.item.lapses, before.lapses + 1);
    assert!(lapse.item.stability < before.stability);
    assert!(lapse.item.difficulty > before.difficulty);
    assert_minutes(lapse.scheduled_days, 10.0);

    // Failing again while relearning is a retry, not another lapse
    let retry = journey.review_when_due(Rating::Again);
    assert_eq!(retry.item.phase, Phase::Relearning);
    assert_eq!(retry.item.lapses, lapse.item.lapses);
    assert_eq!(retry.item.difficulty, lapse.item.difficulty);

    let hard = journey.review_when_due(Rating::Hard);
    assert_eq!(hard.item.phase, Phase::Relearning);
    assert_minutes(hard.scheduled_days, 15.0);

    let back = journey.review_when_due(Rating::Good);
    assert_eq!(back.item.phase, Phase::Review);
    assert_eq!(back.scheduled_days, 0.5);
    assert_valid(&back.item);
}

#[test]
fn test_preview_matches_review_choices() {
    let mut journey = Journey::start("森", "forest");
    journey.review_after(TimeDelta::zero(), Rating::Good);
    journey.review_when_due(Rating::Good);
    journey.review_when_due(Rating::Good);

    let due = journey.item.due_at.unwrap();
    let scheduler = scheduler_at(due);
    let preview = scheduler.preview_intervals(&journey.item, Some(due));

    let mut previous = 0.0;
    for (rating, days) in preview.iter() {
        assert!(days >= previous, "{rating}");
        previous = days;
    }
    let again = scheduler.review(&journey.item, Rating::Again, Some(due));
    assert_eq!(preview.again, again.scheduled_days);
    let easy = scheduler.review(&journey.item, Rating::Easy, Some(due));
    assert!(preview.easy >= easy.scheduled_days);
}
