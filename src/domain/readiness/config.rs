//! Readiness coordinator configuration.

use serde::Deserialize;

use crate::domain::foundation::ValidationError;

/// Early-start and context formatting settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadinessConfig {
    /// Completed rounds after which dependents may start.
    ///
    /// Default: 2
    #[serde(default = "default_early_start_threshold")]
    pub early_start_threshold: u32,

    /// Characters of a round summary included in partial context.
    ///
    /// Default: 500
    #[serde(default = "default_summary_preview_chars")]
    pub summary_preview_chars: usize,

    /// Most recent early insights included in partial context.
    ///
    /// Default: 3
    #[serde(default = "default_max_insights")]
    pub max_insights: usize,
}

impl ReadinessConfig {
    /// Validate readiness configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.early_start_threshold == 0 {
            return Err(ValidationError::MustBePositive("early_start_threshold"));
        }
        if self.summary_preview_chars == 0 {
            return Err(ValidationError::MustBePositive("summary_preview_chars"));
        }
        Ok(())
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            early_start_threshold: default_early_start_threshold(),
            summary_preview_chars: default_summary_preview_chars(),
            max_insights: default_max_insights(),
        }
    }
}

fn default_early_start_threshold() -> u32 {
    2
}

fn default_summary_preview_chars() -> usize {
    500
}

fn default_max_insights() -> usize {
    3
}
