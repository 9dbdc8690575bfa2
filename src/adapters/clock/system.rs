//! System clock backed by `std::time::Instant`.

use std::sync::Arc;
use std::time::Instant;

use crate::ports::Clock;

/// Production clock reading the OS monotonic timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    pub fn new() -> Self {
        Self
    }

    /// A system clock behind the `Clock` port, ready to share.
    pub fn shared() -> Arc<dyn Clock> {
        Arc::new(Self)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
