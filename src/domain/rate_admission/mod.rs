//! Rate admission - per-session gating of outbound LLM calls.
//!
//! Two independent limits protect the LLM budget:
//!
//! - a hard cap on the deliberation round number a session may reach, and
//! - a sliding-window cap on how many model calls a session may issue.
//!
//! Denials are ordinary return values. Retry, reject or defer policy belongs
//! to the caller (the LLM dispatch layer).
//!
//! ## Usage
//!
//! ```ignore
//! let limiter = RateAdmission::new(RateAdmissionConfig::default(), clock);
//!
//! if !limiter.check_round_limit(session_id, round) {
//!     return Err(DeliberationError::RoundCapReached);
//! }
//! match limiter.check_call_rate(session_id) {
//!     CallDecision::Allowed => dispatch(request).await,
//!     CallDecision::Throttled { wait } => {
//!         tokio::time::sleep(wait).await;
//!         limiter.record_call(session_id);
//!         dispatch(request).await
//!     }
//! }
//! ```

mod config;
mod limiter;
mod session_state;

pub use config::RateAdmissionConfig;
pub use limiter::{CallDecision, RateAdmission, SessionRateStats};
pub use session_state::SessionRateState;
