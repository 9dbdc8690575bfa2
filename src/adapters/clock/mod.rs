//! Clock adapters.
//!
//! - `SystemClock` - Real monotonic time for production
//! - `ManualClock` - Time that only moves when a test advances it

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;
