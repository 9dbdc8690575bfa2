//! Error types for the domain layer.

use thiserror::Error;

/// Errors from validating component settings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("{field} must not exceed {max}")]
    TooLarge { field: &'static str, max: u64 },

    #[error("{0} must be within (0, 100]")]
    ThresholdOutOfRange(&'static str),

    #[error("Degradation threshold must not exceed shed threshold")]
    ThresholdsInverted,
}

impl ValidationError {
    /// Creates a too-large validation error.
    pub fn too_large(field: &'static str, max: u64) -> Self {
        ValidationError::TooLarge { field, max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_field() {
        assert_eq!(
            ValidationError::MustBePositive("window_secs").to_string(),
            "window_secs must be greater than zero"
        );
        assert_eq!(
            ValidationError::too_large("window_secs", 86_400).to_string(),
            "window_secs must not exceed 86400"
        );
    }
}
