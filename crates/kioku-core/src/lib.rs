//! # Kioku Core
//!
//! Spaced repetition scheduling engine for vocabulary items:
//!
//! - **Phase State Machine**: learning / review / relearning with lapse tracking
//! - **Memory Model**: stability/difficulty updates driven by retrievability and review timing
//! - **Interval Scheduler**: monotonic, phase-aware schedule lengths with day/half-day quantization
//! - **Timeline Repair**: trustworthy timestamps from corrupted or clock-skewed records
//! - **Item Factory**: safe defaults and collision-free identifiers without a randomness source
//!
//! Every scheduling operation is a pure function of its explicit inputs plus one
//! read of an injected [`Clock`], which is only ever used as a plausibility oracle.
//! No operation fails on malformed input: every class of corruption is repaired
//! to a conservative fallback.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use kioku_core::{FixedClock, ItemFactory, Phase, Rating, Scheduler};
//!
//! let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
//! let clock = FixedClock::new(now);
//!
//! let factory = ItemFactory::with_clock(clock);
//! let item = factory.create_new("猫", "cat", Some(now), None);
//!
//! let scheduler = Scheduler::with_clock(clock);
//! let outcome = scheduler.review(&item, Rating::Good, Some(now));
//!
//! assert_eq!(outcome.item.phase, Phase::Review);
//! assert_eq!(outcome.scheduled_days, 0.5);
//!
//! let preview = scheduler.preview_intervals(&outcome.item, Some(now));
//! assert!(preview.again <= preview.easy);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod clock;
pub mod factory;
pub mod fsrs;
pub mod memory;
pub mod policy;
pub mod scheduler;
pub mod timeline;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use clock::{Clock, FixedClock, IdSequence, SystemClock};

pub use factory::ItemFactory;

// Scheduling algorithm
pub use fsrs::{
    interval_for_retention, retrievability, MemoryState, Phase, PhaseTransition, Rating,
    MAX_DIFFICULTY, MAX_STABILITY, MIN_DIFFICULTY, MIN_STABILITY,
};

// Item record
pub use memory::{
    format_timestamp, normalize_notes, normalize_text, parse_timestamp, Item, RecordError,
};

pub use policy::{PolicyError, PolicyLoadError, SchedulerPolicy};

pub use scheduler::{PreviewIntervals, ReviewOutcome, Scheduler};

pub use timeline::Timeline;

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Clock, FixedClock, Item, ItemFactory, Phase, PreviewIntervals, Rating, ReviewOutcome,
        Scheduler, SchedulerPolicy, SystemClock,
    };
}
