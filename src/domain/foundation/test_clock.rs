//! Stepped clock for domain unit tests.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::ports::Clock;

/// Clock frozen at creation that only moves on `advance`.
#[derive(Debug)]
pub(crate) struct StepClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl StepClock {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }
}

impl Clock for StepClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock().unwrap()
    }
}
