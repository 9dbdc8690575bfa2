//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the admission components and the outside world. Adapters implement these ports.
//!
//! - `Clock` - Monotonic time source shared by the rate and pool components
//! - `PoolHealthProbe` - Connection pool occupancy sampling

mod clock;
mod pool_health;

pub use clock::Clock;
pub use pool_health::{PoolHealthProbe, PoolProbeError, PoolSnapshot};
