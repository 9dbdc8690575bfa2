//! Manually driven clock for deterministic tests.
//!
//! Anchored at the instant it was created; only `advance` moves it.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::ports::Clock;

/// Clock that stands still until advanced.
///
/// # Example
///
/// ```ignore
/// let clock = Arc::new(ManualClock::new());
/// let limiter = RateAdmission::new(config, clock.clone());
///
/// clock.advance(Duration::from_secs(61));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += by;
    }

    /// Total time advanced since creation.
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}
