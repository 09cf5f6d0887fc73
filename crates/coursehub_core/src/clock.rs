//! Time source for dates and record identifiers.
//!
//! # Invariants
//! - All timestamps in the data layer are Unix epoch milliseconds.
//! - `next_record_id` never returns an id at or below an existing one.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Epoch-millisecond time source injected into the data layer.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Wall clock backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as i64)
    }
}

/// Settable clock whose clones share one instant.
///
/// Hand one clone to the data layer and keep another to move time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<i64>>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }
}

/// Picks a fresh id: the current time, bumped past the largest existing id.
pub fn next_record_id(clock: &dyn Clock, max_existing: Option<i64>) -> i64 {
    let now = clock.now_ms();
    match max_existing {
        Some(max) if max >= now => max + 1,
        _ => now,
    }
}
