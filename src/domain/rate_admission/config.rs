//! Rate admission configuration.

use serde::Deserialize;
use std::time::Duration;

use crate::domain::foundation::ValidationError;

/// Longest accepted sliding window: one day.
const MAX_WINDOW_SECS: u64 = 86_400;

/// Limits applied to every deliberation session.
#[derive(Debug, Clone, Deserialize)]
pub struct RateAdmissionConfig {
    /// Global switch. When false every check is allowed and no state is kept.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Highest deliberation round a session may run.
    ///
    /// Default: 10
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    /// Model calls allowed per session inside one window.
    ///
    /// Default: 6
    #[serde(default = "default_max_calls_per_window")]
    pub max_calls_per_window: u32,

    /// Sliding window length in seconds.
    ///
    /// Default: 60
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Windows of inactivity after which a session is swept.
    ///
    /// Default: 5
    #[serde(default = "default_cleanup_multiplier")]
    pub cleanup_multiplier: u32,

    /// Minimum seconds between two staleness sweeps.
    ///
    /// Default: 60
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

impl RateAdmissionConfig {
    /// Sliding window length.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Idle time after which a session counts as stale.
    pub fn stale_after(&self) -> Duration {
        self.window().saturating_mul(self.cleanup_multiplier)
    }

    /// Minimum time between staleness sweeps.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    /// Config with limiting switched off (benchmarks, load tests).
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Validate rate admission configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_rounds == 0 {
            return Err(ValidationError::MustBePositive("max_rounds"));
        }
        if self.max_calls_per_window == 0 {
            return Err(ValidationError::MustBePositive("max_calls_per_window"));
        }
        if self.window_secs == 0 {
            return Err(ValidationError::MustBePositive("window_secs"));
        }
        if self.window_secs > MAX_WINDOW_SECS {
            return Err(ValidationError::too_large("window_secs", MAX_WINDOW_SECS));
        }
        if self.cleanup_multiplier == 0 {
            return Err(ValidationError::MustBePositive("cleanup_multiplier"));
        }
        Ok(())
    }
}

impl Default for RateAdmissionConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_rounds: default_max_rounds(),
            max_calls_per_window: default_max_calls_per_window(),
            window_secs: default_window_secs(),
            cleanup_multiplier: default_cleanup_multiplier(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_max_rounds() -> u32 {
    10
}

fn default_max_calls_per_window() -> u32 {
    6
}

fn default_window_secs() -> u64 {
    60
}

fn default_cleanup_multiplier() -> u32 {
    5
}

fn default_cleanup_interval_secs() -> u64 {
    60
}
