//! Clock port - Monotonic time source for admission decisions.
//!
//! Sliding windows, staleness sweeps and degraded-period accounting all
//! measure elapsed time. Injecting the clock lets tests move time forward
//! deterministically instead of sleeping.

use std::time::Instant;

/// Port for reading monotonic time.
///
/// Implementations must never go backwards.
pub trait Clock: Send + Sync {
    /// Returns the current monotonic instant.
    fn now(&self) -> Instant;
}
