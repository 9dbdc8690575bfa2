//! Readiness coordination - speculative early start for dependent sub-problems.
//!
//! A decomposed problem is deliberated as several sub-problems, some of
//! which depend on others. Instead of waiting for a prerequisite to finish,
//! a dependent sub-problem may start once the prerequisite has run enough
//! rounds to produce useful partial output.
//!
//! Two separate capabilities are exposed:
//!
//! - a non-blocking hint, [`ReadinessCoordinator::get_partial_context`], that
//!   formats whatever the dependencies have produced so far, and
//! - a blocking barrier, [`ReadinessCoordinator::wait_ready`] /
//!   [`ReadinessCoordinator::wait_complete`], that the scheduler opts into.
//!
//! Each sub-problem owns two one-way latches. "ready" fires when the
//! early-start threshold is reached or the sub-problem completes; "complete"
//! fires on completion only. Neither is ever cleared.
//!
//! ## Usage
//!
//! ```ignore
//! let coordinator = Arc::new(ReadinessCoordinator::new(ReadinessConfig::default()));
//! coordinator.register(0, "market", "Size the market", 5, panel).await;
//! coordinator.register(1, "pricing", "Choose a price", 5, panel).await;
//!
//! // Sub-problem 1 waits for early signal from 0, then reads it.
//! if coordinator.wait_ready(&[0], Some(Duration::from_secs(120))).await {
//!     let context = coordinator.get_partial_context(1, &[0]).await;
//!     prompt.push_str(&context.formatted);
//! }
//! ```

mod config;
mod context;
mod coordinator;
mod progress;

pub use config::ReadinessConfig;
pub use context::PartialContext;
pub use coordinator::ReadinessCoordinator;
pub use progress::SubProblemProgress;
