//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `DELIBERATION` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use deliberation_admission::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};

pub use crate::domain::pool_degradation::PoolDegradationConfig;
pub use crate::domain::rate_admission::RateAdmissionConfig;
pub use crate::domain::readiness::ReadinessConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, log level)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL pool and health probe)
    pub database: DatabaseConfig,

    /// Per-session LLM call and round limits
    #[serde(default)]
    pub rate_admission: RateAdmissionConfig,

    /// Connection pool degradation thresholds and admission gate
    #[serde(default)]
    pub pool_degradation: PoolDegradationConfig,

    /// Sub-problem early-start settings
    #[serde(default)]
    pub readiness: ReadinessConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `DELIBERATION` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `DELIBERATION__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `DELIBERATION__RATE_ADMISSION__MAX_CALLS_PER_WINDOW=10` -> `rate_admission.max_calls_per_window = 10`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DELIBERATION")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.rate_admission.validate()?;
        self.pool_degradation.validate()?;
        self.readiness.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("DELIBERATION__DATABASE__URL", "postgresql://test@localhost/test");
    }

    fn clear_env() {
        env::remove_var("DELIBERATION__DATABASE__URL");
        env::remove_var("DELIBERATION__SERVER__PORT");
        env::remove_var("DELIBERATION__SERVER__ENVIRONMENT");
        env::remove_var("DELIBERATION__RATE_ADMISSION__MAX_CALLS_PER_WINDOW");
        env::remove_var("DELIBERATION__RATE_ADMISSION__ENABLED");
        env::remove_var("DELIBERATION__POOL_DEGRADATION__QUEUE_MAX_SIZE");
        env::remove_var("DELIBERATION__READINESS__EARLY_START_THRESHOLD");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_component_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(config.rate_admission.enabled);
        assert_eq!(config.rate_admission.max_rounds, 10);
        assert_eq!(config.pool_degradation.queue_max_size, 50);
        assert_eq!(config.readiness.early_start_threshold, 2);
    }

    #[test]
    fn test_component_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("DELIBERATION__RATE_ADMISSION__MAX_CALLS_PER_WINDOW", "12");
        env::set_var("DELIBERATION__RATE_ADMISSION__ENABLED", "false");
        env::set_var("DELIBERATION__POOL_DEGRADATION__QUEUE_MAX_SIZE", "8");
        env::set_var("DELIBERATION__READINESS__EARLY_START_THRESHOLD", "3");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.rate_admission.max_calls_per_window, 12);
        assert!(!config.rate_admission.enabled);
        assert_eq!(config.pool_degradation.queue_max_size, 8);
        assert_eq!(config.readiness.early_start_threshold, 3);
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("DELIBERATION__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_component_validation_errors_propagate() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("DELIBERATION__POOL_DEGRADATION__QUEUE_MAX_SIZE", "0");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.validate(),
            Err(ValidationError::Component(
                crate::domain::foundation::ValidationError::MustBePositive("queue_max_size")
            ))
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        assert!(AppConfig::load().is_err());
    }
}
