//! Domain layer containing the admission-control components.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives
//! - `rate_admission` - Per-session LLM call and round gating
//! - `pool_degradation` - Connection pool tiering, shedding and the admission gate
//! - `readiness` - Speculative readiness coordination between sub-problems
//!
//! The three components never call each other; each owns exactly one lock.

pub mod foundation;
pub mod pool_degradation;
pub mod rate_admission;
pub mod readiness;
