//! Deliberation Admission - Concurrency control for multi-agent deliberation
//!
//! Three components decide when work may proceed:
//!
//! - `RateAdmission` caps deliberation rounds and LLM calls per session
//!   using a sliding window.
//! - `PoolDegradation` tracks database pool utilization, gates work while
//!   the pool is degraded, and sheds writes when it is nearly exhausted.
//! - `ReadinessCoordinator` lets dependent sub-problems start once their
//!   prerequisites have produced enough partial output.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
