//! Tick sources.
//!
//! - [`MonotonicClock`]: milliseconds since construction, from
//!   `std::time::Instant`.  Used by the demo binary.
//! - [`ManualClock`]: a counter that only moves when told to.  Used by
//!   tests and simulations that need exact control over response windows.
//!   Clones share the same counter.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::app::ports::{TickSource, Ticks};

/// Millisecond tick source backed by the host's monotonic clock.
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl TickSource for MonotonicClock {
    fn ticks(&self) -> Ticks {
        self.start.elapsed().as_millis() as Ticks
    }
}

/// Explicitly advanced tick source.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(ticks: Ticks) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(ticks)),
        }
    }

    pub fn advance(&self, ticks: Ticks) {
        self.now.fetch_add(ticks, Ordering::Relaxed);
    }

    pub fn set(&self, ticks: Ticks) {
        self.now.store(ticks, Ordering::Relaxed);
    }
}

impl TickSource for ManualClock {
    fn ticks(&self) -> Ticks {
        self.now.load(Ordering::Relaxed)
    }
}
