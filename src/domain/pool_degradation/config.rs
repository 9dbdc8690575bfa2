//! Pool degradation configuration.

use serde::Deserialize;

use crate::domain::foundation::ValidationError;

/// Thresholds and admission gate sizing.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolDegradationConfig {
    /// Utilization percentage at which the pool counts as degraded.
    ///
    /// Default: 90
    #[serde(default = "default_degradation_threshold")]
    pub degradation_threshold_pct: f64,

    /// Utilization percentage at which mutating requests are shed.
    ///
    /// Default: 95
    #[serde(default = "default_shed_threshold")]
    pub shed_threshold_pct: f64,

    /// Maximum concurrently admitted units of work while degraded.
    ///
    /// Default: 50
    #[serde(default = "default_queue_max_size")]
    pub queue_max_size: usize,

    /// Base retry hint handed to rejected callers, in seconds.
    ///
    /// Default: 5
    #[serde(default = "default_retry_after_base")]
    pub retry_after_base_secs: u64,

    /// Upper bound of the random jitter added to the retry hint.
    ///
    /// Default: 5
    #[serde(default = "default_retry_after_jitter")]
    pub retry_after_jitter_secs: u64,
}

impl PoolDegradationConfig {
    /// Validate pool degradation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.degradation_threshold_pct > 0.0 && self.degradation_threshold_pct <= 100.0) {
            return Err(ValidationError::ThresholdOutOfRange("degradation_threshold_pct"));
        }
        if !(self.shed_threshold_pct > 0.0 && self.shed_threshold_pct <= 100.0) {
            return Err(ValidationError::ThresholdOutOfRange("shed_threshold_pct"));
        }
        if self.degradation_threshold_pct > self.shed_threshold_pct {
            return Err(ValidationError::ThresholdsInverted);
        }
        if self.queue_max_size == 0 {
            return Err(ValidationError::MustBePositive("queue_max_size"));
        }
        Ok(())
    }
}

impl Default for PoolDegradationConfig {
    fn default() -> Self {
        Self {
            degradation_threshold_pct: default_degradation_threshold(),
            shed_threshold_pct: default_shed_threshold(),
            queue_max_size: default_queue_max_size(),
            retry_after_base_secs: default_retry_after_base(),
            retry_after_jitter_secs: default_retry_after_jitter(),
        }
    }
}

fn default_degradation_threshold() -> f64 {
    90.0
}

fn default_shed_threshold() -> f64 {
    95.0
}

fn default_queue_max_size() -> usize {
    50
}

fn default_retry_after_base() -> u64 {
    5
}

fn default_retry_after_jitter() -> u64 {
    5
}
