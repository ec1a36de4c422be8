//! Time sources for the session
//!
//! Timers in the session are wall-clock seconds, not frame counts. Live use
//! reads a monotonic clock; simulation and tests drive a manual one.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Seconds elapsed since some fixed origin
pub trait Clock {
    fn now_secs(&self) -> f64;
}

/// Monotonic clock anchored at construction
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Manually advanced clock
///
/// Clones share the same time, so a caller can keep a handle while the
/// session owns another.
///
/// ```
/// use engine_audio::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// handle.advance(1.5);
/// assert_eq!(clock.now_secs(), 1.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, secs: f64) {
        self.now.set(secs);
    }

    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> f64 {
        self.now.get()
    }
}
