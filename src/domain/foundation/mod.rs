//! Foundation module - Shared domain primitives.
//!
//! Value objects and errors used by more than one admission component.

mod errors;
mod timestamp;

#[cfg(test)]
pub(crate) mod test_clock;

pub use errors::ValidationError;
pub use timestamp::Timestamp;
