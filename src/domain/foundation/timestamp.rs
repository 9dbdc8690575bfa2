//! Timestamp value object for wall-clock reporting.
//!
//! Admission decisions are made against a monotonic [`Clock`](crate::ports::Clock);
//! `Timestamp` only appears in snapshots handed to operators and dashboards.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.0 >= before);
        assert!(ts.0 <= after);
    }

    #[test]
    fn timestamp_serializes_as_rfc3339_string() {
        let dt = DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let json = serde_json::to_string(&Timestamp(dt)).unwrap();
        assert!(json.starts_with("\"2024-01-15T10:30:00"));
    }
}
