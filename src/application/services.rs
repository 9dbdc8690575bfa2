//! Process-wide admission services.
//!
//! `RateAdmission` and `PoolDegradation` are shared by every deliberation in
//! the process. `ReadinessCoordinator` is scoped to one decomposed problem, so
//! the container only hands out fresh coordinators built from shared config.
//!
//! Prefer constructing [`AdmissionServices`] in `main` and passing it down.
//! The global accessor exists for call sites that cannot be threaded through;
//! it is created lazily and can be reset between tests.

use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use crate::adapters::clock::SystemClock;
use crate::config::AppConfig;
use crate::domain::pool_degradation::{PoolDegradation, PoolDegradationConfig};
use crate::domain::rate_admission::{RateAdmission, RateAdmissionConfig};
use crate::domain::readiness::{ReadinessConfig, ReadinessCoordinator};
use crate::ports::Clock;

/// Shared admission components for one process.
#[derive(Debug, Clone)]
pub struct AdmissionServices {
    pub rate_admission: Arc<RateAdmission>,
    pub pool_degradation: Arc<PoolDegradation>,
    readiness: ReadinessConfig,
}

impl AdmissionServices {
    /// Build every component from explicit configs, reading the system clock.
    pub fn new(
        rate_admission: RateAdmissionConfig,
        pool_degradation: PoolDegradationConfig,
        readiness: ReadinessConfig,
    ) -> Self {
        Self::with_clock(rate_admission, pool_degradation, readiness, SystemClock::shared())
    }

    /// Build every component from the application config.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.rate_admission.clone(),
            config.pool_degradation.clone(),
            config.readiness.clone(),
        )
    }

    /// Build components that read time from `clock`.
    pub fn with_clock(
        rate_admission: RateAdmissionConfig,
        pool_degradation: PoolDegradationConfig,
        readiness: ReadinessConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rate_admission: Arc::new(RateAdmission::new(rate_admission, clock.clone())),
            pool_degradation: Arc::new(PoolDegradation::new(pool_degradation, clock)),
            readiness,
        }
    }

    /// A fresh coordinator for one decomposed problem.
    pub fn readiness_coordinator(&self) -> ReadinessCoordinator {
        ReadinessCoordinator::new(self.readiness.clone())
    }
}

impl Default for AdmissionServices {
    fn default() -> Self {
        Self::new(
            RateAdmissionConfig::default(),
            PoolDegradationConfig::default(),
            ReadinessConfig::default(),
        )
    }
}

static GLOBAL: Lazy<RwLock<Option<Arc<AdmissionServices>>>> = Lazy::new(|| RwLock::new(None));

/// Install `services` as the process-wide instance, replacing any previous one.
pub fn install_global(services: Arc<AdmissionServices>) {
    *GLOBAL.write().unwrap_or_else(PoisonError::into_inner) = Some(services);
}

/// The process-wide instance, created with defaults on first use.
pub fn global() -> Arc<AdmissionServices> {
    if let Some(services) = GLOBAL.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
        return services.clone();
    }

    let mut slot = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    slot.get_or_insert_with(|| Arc::new(AdmissionServices::default()))
        .clone()
}

/// Drop the process-wide instance so the next [`global`] call rebuilds it.
pub fn reset_global() {
    *GLOBAL.write().unwrap_or_else(PoisonError::into_inner) = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use std::sync::Mutex;
    use std::time::Duration;

    // The global slot is process-wide; serialize tests that touch it.
    static GLOBAL_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn global_is_created_once() {
        let _guard = GLOBAL_MUTEX.lock().unwrap();
        reset_global();

        let first = global();
        let second = global();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn reset_global_rebuilds_instance() {
        let _guard = GLOBAL_MUTEX.lock().unwrap();
        reset_global();

        let first = global();
        first.rate_admission.check_call_rate("s1");
        reset_global();

        let second = global();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.rate_admission.tracked_sessions(), 0);
    }

    #[test]
    fn install_global_replaces_instance() {
        let _guard = GLOBAL_MUTEX.lock().unwrap();
        let custom = Arc::new(AdmissionServices::new(
            RateAdmissionConfig::disabled(),
            PoolDegradationConfig::default(),
            ReadinessConfig::default(),
        ));

        install_global(custom.clone());
        assert!(Arc::ptr_eq(&global(), &custom));
        assert!(!global().rate_admission.is_enabled());
        reset_global();
    }

    #[tokio::test]
    async fn coordinators_are_independent() {
        let services = AdmissionServices::default();
        let a = services.readiness_coordinator();
        let b = services.readiness_coordinator();

        a.register(0, "sp", "goal", 3, vec![]).await;
        assert_eq!(a.get_all_progress().await.len(), 1);
        assert!(b.get_all_progress().await.is_empty());
        assert_eq!(a.early_start_threshold(), 2);
    }

    #[test]
    fn injected_clock_drives_every_component() {
        let clock = Arc::new(ManualClock::new());
        let services = AdmissionServices::with_clock(
            RateAdmissionConfig::default(),
            PoolDegradationConfig::default(),
            ReadinessConfig::default(),
            clock.clone(),
        );

        for _ in 0..6 {
            assert!(services.rate_admission.check_call_rate("s1").is_allowed());
        }
        assert!(services.rate_admission.check_call_rate("s1").is_throttled());

        services.pool_degradation.update_pool_state(18, 2, 20);
        clock.advance(Duration::from_secs(61));
        services.pool_degradation.update_pool_state(5, 15, 20);

        assert!(services.rate_admission.check_call_rate("s1").is_allowed());
        assert_eq!(services.pool_degradation.stats().total_degraded_secs, 61.0);
    }
}
