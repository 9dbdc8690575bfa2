//! Pool exhaustion error.

use serde::Serialize;
use thiserror::Error;

/// The admission gate is full.
///
/// Carries enough for an HTTP layer to build a precise retryable response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[error("connection pool admission queue is full ({queue_depth} waiting); retry after {retry_after_secs}s")]
pub struct PoolExhaustionError {
    /// Queue depth observed when admission was refused.
    pub queue_depth: usize,
    /// Suggested wait before retrying, in seconds.
    pub retry_after_secs: u64,
}

/// Why [`PoolDegradation::admit`](super::PoolDegradation::admit) refused work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdmissionRejection {
    /// The pool is shedding and the work mutates.
    #[error("connection pool is shedding load; retry after {retry_after_secs}s")]
    Shed { retry_after_secs: u64 },

    /// The admission gate is full.
    #[error(transparent)]
    Exhausted(#[from] PoolExhaustionError),
}

impl AdmissionRejection {
    /// Retry hint carried by the rejection.
    pub fn retry_after_secs(&self) -> u64 {
        match self {
            AdmissionRejection::Shed { retry_after_secs } => *retry_after_secs,
            AdmissionRejection::Exhausted(err) => err.retry_after_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_exposes_retry_hint() {
        let shed = AdmissionRejection::Shed { retry_after_secs: 4 };
        assert_eq!(shed.retry_after_secs(), 4);

        let exhausted: AdmissionRejection = PoolExhaustionError {
            queue_depth: 3,
            retry_after_secs: 9,
        }
        .into();
        assert_eq!(exhausted.retry_after_secs(), 9);
    }

    #[test]
    fn message_includes_depth_and_wait() {
        let err = PoolExhaustionError {
            queue_depth: 50,
            retry_after_secs: 7,
        };
        let message = err.to_string();
        assert!(message.contains("50 waiting"));
        assert!(message.contains("retry after 7s"));
    }
}
