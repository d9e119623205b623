//! # Import / Export Journey Tests
//!
//! Items leave the engine as JSON records and come back later, possibly from
//! another device. These tests check the record contract end to end.

use chrono::TimeDelta;
use kioku_core::{Item, Phase, Rating, format_timestamp, parse_timestamp};
use kioku_e2e_tests::{TestDataFactory, review_at, t0};

#[test]
fn test_record_shape_is_canonical() {
    let item = TestDataFactory::fresh_item("  猫 ", "cat", t0());
    let value: serde_json::Value = serde_json::from_str(&item.to_json().unwrap()).unwrap();
    let object = value.as_object().unwrap();

    for key in [
        "id",
        "word",
        "meaning",
        "createdAt",
        "updatedAt",
        "dueAt",
        "phase",
        "reps",
        "lapses",
        "stability",
        "difficulty",
    ] {
        assert!(object.contains_key(key), "missing {key}");
    }
    assert!(!object.contains_key("notes"));
    assert_eq!(object["word"], "猫");
    assert_eq!(object["phase"], "learning");
    assert_eq!(object["createdAt"], "2025-03-01T09:00:00.000Z");
    assert_eq!(object["reps"], 0);
}

#[test]
fn test_timestamps_survive_parse_format_cycle() {
    let outcome = review_at(
        &TestDataFactory::fresh_item("猫", "cat", t0()),
        Rating::Good,
        t0() + TimeDelta::milliseconds(1_234),
    );
    for at in [outcome.item.created_at, outcome.item.updated_at, outcome.item.due_at] {
        let at = at.unwrap();
        let formatted = format_timestamp(at);
        assert!(formatted.ends_with('Z'));
        assert_eq!(parse_timestamp(&formatted), Some(at));
    }
}

#[test]
fn test_sub_millisecond_review_instant_survives_save_and_load() {
    let item = TestDataFactory::fresh_item("猫", "cat", t0());
    let now = t0() + TimeDelta::microseconds(1_500);
    let outcome = review_at(&item, Rating::Good, now);

    assert_eq!(outcome.item.updated_at, Some(t0() + TimeDelta::milliseconds(1)));
    let back = Item::from_json(&outcome.item.to_json().unwrap()).unwrap();
    assert_eq!(back, outcome.item);
}

#[test]
fn test_export_import_review_cycle() {
    let mut item = TestDataFactory::fresh_item("鳥", "bird", t0());
    let mut now = t0();

    for rating in [Rating::Good, Rating::Good, Rating::Easy, Rating::Again, Rating::Good] {
        let exported = item.to_json().unwrap();
        let imported = Item::from_json(&exported).unwrap();
        assert_eq!(imported, item);

        let outcome = review_at(&imported, rating, now);
        item = outcome.item;
        now = item.due_at.unwrap();
    }
    assert_eq!(item.phase, Phase::Review);
    assert_eq!(item.lapses, 1);
    assert_eq!(item.reps, 5);
}

#[test]
fn test_unknown_fields_are_ignored_on_import() {
    let json = r#"{"id":"x","word":"w","meaning":"m","phase":"review","stability":3,"difficulty":4,"deck":"JLPT N5","tags":["noun"]}"#;
    let item = Item::from_json(json).unwrap();
    assert_eq!(item.phase, Phase::Review);
    assert_eq!(item.stability, 3.0);
}

#[test]
fn test_notes_survive_when_present() {
    let item = kioku_core::ItemFactory::with_clock(kioku_core::FixedClock::new(t0())).create_new(
        "本",
        "book",
        Some(t0()),
        Some("ほん\r\n\r\n\r\nread: hon"),
    );
    assert_eq!(item.notes.as_deref(), Some("ほん\n\nread: hon"));
    let back = Item::from_json(&item.to_json().unwrap()).unwrap();
    assert_eq!(back.notes, item.notes);
}

#[test]
fn test_batch_ids_are_unique_and_stable() {
    let batch = TestDataFactory::create_batch(500);
    let mut ids: Vec<&str> = batch.iter().map(|i| i.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 500);

    let json = serde_json::to_string(&batch).unwrap();
    let back: Vec<Item> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, batch);
}

#[test]
fn test_non_object_payload_is_the_only_failure() {
    assert!(Item::from_json("null").is_err());
    assert!(Item::from_json("\"item\"").is_err());
    assert!(Item::from_json("{").is_err());
    for (name, json) in TestDataFactory::corrupted_records() {
        assert!(Item::from_json(&json).is_ok(), "{name}");
    }
}
