//! Injectable time source
//!
//! Every timestamp the engine records comes from a [`Clock`] rather than the
//! wall clock directly, so tests can drive time deterministically and the
//! timing-sensitive policies (pointer sampling gate, focus accounting,
//! typing-speed windows) stay reproducible.

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;
use std::rc::Rc;

/// Source of the current time for the engine.
pub trait Clock {
    /// Current instant (UTC).
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock advanced manually.
///
/// Clones share the same underlying instant, so a test can keep a handle
/// while the engine owns another. Single-threaded by design, matching the
/// engine's execution model.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    /// Create a clock pinned to `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Rc::new(Cell::new(start)),
        }
    }

    /// Advance the clock by `ms` milliseconds.
    pub fn advance_ms(&self, ms: i64) {
        self.current
            .set(self.current.get() + Duration::milliseconds(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.current.get()
    }
}
