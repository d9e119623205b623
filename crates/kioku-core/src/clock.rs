//! Clock and identity capabilities
//!
//! The engine never reads global time or global counters directly. Wall-clock
//! access goes through [`Clock`], and the per-process identity sequence used by
//! the item factory is an explicit [`IdSequence`] value owned by the factory.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

// ============================================================================
// CLOCK
// ============================================================================

/// Source of the current wall-clock instant.
///
/// The scheduler only uses this as a skew-detection oracle; a valid explicit
/// review instant always takes precedence.
pub trait Clock {
    /// Current wall-clock instant
    fn now(&self) -> DateTime<Utc>;
}

/// The operating system clock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant, for deterministic replays and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    /// Create a clock that always reports `at`
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }

    /// The frozen instant
    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

// ============================================================================
// ID SEQUENCE
// ============================================================================

/// Monotonically increasing sequence used to disambiguate item identifiers
/// created within the same millisecond.
///
/// Safe to share between threads; every call to [`IdSequence::next_value`] returns a
/// distinct value until the counter wraps after 2^64 calls.
#[derive(Debug, Default)]
pub struct IdSequence {
    next: AtomicU64,
}

impl IdSequence {
    /// Sequence starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence starting at `start` (useful when resuming a persisted counter)
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }

    /// Take the next value
    pub fn next_value(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Peek at the value the next call will return
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

// ============================================================================
// TESTS
// ============================================================================
