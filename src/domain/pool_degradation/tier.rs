//! Degradation tier derived from pool utilization.

use serde::Serialize;
use std::fmt;

/// Pool health tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationTier {
    /// No restriction.
    Normal,
    /// Reads go through the admission gate.
    Degraded,
    /// Mutating requests are rejected.
    Shedding,
}

impl DegradationTier {
    /// Classify a utilization percentage against the two thresholds.
    pub fn classify(utilization_pct: f64, degradation_threshold: f64, shed_threshold: f64) -> Self {
        if utilization_pct >= shed_threshold {
            DegradationTier::Shedding
        } else if utilization_pct >= degradation_threshold {
            DegradationTier::Degraded
        } else {
            DegradationTier::Normal
        }
    }

    /// Whether the tier restricts anything at all.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, DegradationTier::Normal)
    }

    /// Whether mutating requests should be rejected.
    pub fn sheds_load(&self) -> bool {
        matches!(self, DegradationTier::Shedding)
    }

    /// Returns the string representation of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            DegradationTier::Normal => "normal",
            DegradationTier::Degraded => "degraded",
            DegradationTier::Shedding => "shedding",
        }
    }
}

impl fmt::Display for DegradationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a unit of work reads or mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// May queue behind the admission gate while degraded.
    Read,
    /// Rejected outright while shedding.
    Mutating,
}
