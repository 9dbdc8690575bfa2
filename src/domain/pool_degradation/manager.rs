//! Degradation manager: tier tracking, admission gate and counters.
//!
//! All mutable state sits behind one `std::sync::Mutex`, including the
//! queue depth, so reads never race writes. The admission gate is a counted
//! capacity check, not a wait queue: admitted callers go straight to the pool,
//! whose own checkout already blocks.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

use super::config::PoolDegradationConfig;
use super::error::{AdmissionRejection, PoolExhaustionError};
use super::tier::{DegradationTier, RequestKind};

/// Immutable snapshot of the degradation manager.
#[derive(Debug, Clone, Serialize)]
pub struct DegradationStats {
    pub tier: DegradationTier,
    pub is_degraded: bool,
    pub should_shed_load: bool,
    pub pool_utilization_pct: f64,
    pub pool_used: u32,
    pub pool_free: u32,
    pub pool_max: u32,
    pub queue_depth: usize,
    pub queue_max_size: usize,
    pub requests_queued_total: u64,
    pub requests_shed_total: u64,
    pub queue_timeouts_total: u64,
    /// Start of the ongoing degraded period, if any.
    pub degraded_since: Option<Timestamp>,
    /// Sum of all completed degraded periods.
    pub total_degraded_secs: f64,
    /// Length of the ongoing degraded period so far.
    pub current_degraded_secs: f64,
}

#[derive(Debug)]
struct DegradationState {
    tier: DegradationTier,
    utilization_pct: f64,
    used: u32,
    free: u32,
    max: u32,
    queue_depth: usize,
    requests_queued_total: u64,
    requests_shed_total: u64,
    queue_timeouts_total: u64,
    degraded_started: Option<Instant>,
    degraded_since: Option<Timestamp>,
    total_degraded: Duration,
}

impl DegradationState {
    fn new() -> Self {
        Self {
            tier: DegradationTier::Normal,
            utilization_pct: 0.0,
            used: 0,
            free: 0,
            max: 0,
            queue_depth: 0,
            requests_queued_total: 0,
            requests_shed_total: 0,
            queue_timeouts_total: 0,
            degraded_started: None,
            degraded_since: None,
            total_degraded: Duration::ZERO,
        }
    }
}

/// Three-tier backpressure controller for a fixed-size connection pool.
pub struct PoolDegradation {
    config: PoolDegradationConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<DegradationState>,
}

impl PoolDegradation {
    /// Create a manager reading time from `clock`.
    pub fn new(config: PoolDegradationConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            state: Mutex::new(DegradationState::new()),
        }
    }

    /// Active thresholds.
    pub fn config(&self) -> &PoolDegradationConfig {
        &self.config
    }

    /// Feed the latest pool counts and recompute the tier.
    ///
    /// Utilization is `100 × used / max`, recomputed from scratch each call.
    /// A zero-capacity pool reports 0%.
    pub fn update_pool_state(&self, used: u32, free: u32, max: u32) -> DegradationTier {
        let utilization_pct = if max == 0 {
            tracing::warn!(used, free, "Pool reported zero capacity; treating as idle");
            0.0
        } else {
            100.0 * f64::from(used) / f64::from(max)
        };
        let tier = DegradationTier::classify(
            utilization_pct,
            self.config.degradation_threshold_pct,
            self.config.shed_threshold_pct,
        );

        let mut state = self.lock();
        let now = self.clock.now();
        let previous = state.tier;

        state.used = used;
        state.free = free;
        state.max = max;
        state.utilization_pct = utilization_pct;
        state.tier = tier;

        match (previous.is_degraded(), tier.is_degraded()) {
            (false, true) => {
                state.degraded_started = Some(now);
                state.degraded_since = Some(Timestamp::now());
            }
            (true, false) => {
                if let Some(started) = state.degraded_started.take() {
                    state.total_degraded += now.saturating_duration_since(started);
                }
                state.degraded_since = None;
            }
            _ => {}
        }
        drop(state);

        if tier > previous {
            tracing::warn!(
                from = %previous,
                to = %tier,
                utilization_pct,
                used,
                max,
                "Connection pool degradation escalated"
            );
        } else if tier < previous {
            tracing::info!(
                from = %previous,
                to = %tier,
                utilization_pct,
                "Connection pool degradation eased"
            );
        }
        tier
    }

    /// Current tier.
    pub fn tier(&self) -> DegradationTier {
        self.lock().tier
    }

    /// Whether utilization is at or above the degradation threshold.
    pub fn is_degraded(&self) -> bool {
        self.lock().tier.is_degraded()
    }

    /// Whether utilization is at or above the shed threshold.
    pub fn should_shed_load(&self) -> bool {
        self.lock().tier.sheds_load()
    }

    /// Take a slot in the admission gate for the guard's lifetime.
    ///
    /// Fails immediately, without waiting, when `queue_max_size` slots are
    /// already taken. The slot is released when the guard drops, whatever
    /// the exit path.
    pub fn scoped_admission(&self) -> Result<AdmissionGuard<'_>, PoolExhaustionError> {
        let mut state = self.lock();
        if state.queue_depth >= self.config.queue_max_size {
            let queue_depth = state.queue_depth;
            drop(state);

            let retry_after_secs = self.retry_after();
            tracing::warn!(queue_depth, retry_after_secs, "Pool admission queue full");
            return Err(PoolExhaustionError {
                queue_depth,
                retry_after_secs,
            });
        }

        state.queue_depth += 1;
        state.requests_queued_total += 1;
        tracing::debug!(queue_depth = state.queue_depth, "Pool admission granted");
        Ok(AdmissionGuard { manager: self })
    }

    /// Apply the tier policy to one unit of work.
    ///
    /// - Normal: proceed without a gate slot.
    /// - Degraded: take a gate slot (reads while shedding too).
    /// - Shedding: reject mutating work and count it as shed.
    pub fn admit(&self, kind: RequestKind) -> Result<Option<AdmissionGuard<'_>>, AdmissionRejection> {
        let tier = self.tier();
        if tier.sheds_load() && kind == RequestKind::Mutating {
            self.record_shed_load();
            let retry_after_secs = self.retry_after();
            tracing::debug!(retry_after_secs, "Mutating request shed");
            return Err(AdmissionRejection::Shed { retry_after_secs });
        }
        if tier.is_degraded() {
            return Ok(Some(self.scoped_admission()?));
        }
        Ok(None)
    }

    /// Count a request rejected because the pool is shedding.
    pub fn record_shed_load(&self) {
        self.lock().requests_shed_total += 1;
    }

    /// Count a pool checkout that timed out after admission.
    pub fn record_queue_timeout(&self) {
        self.lock().queue_timeouts_total += 1;
    }

    /// Retry hint in whole seconds: base plus uniform jitter in `[0, jitter]`.
    pub fn retry_after(&self) -> u64 {
        let jitter = if self.config.retry_after_jitter_secs == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.config.retry_after_jitter_secs)
        };
        self.config.retry_after_base_secs + jitter
    }

    /// Snapshot of flags, counters and queue depth.
    pub fn stats(&self) -> DegradationStats {
        let state = self.lock();
        let now = self.clock.now();
        let current_degraded = state
            .degraded_started
            .map(|started| now.saturating_duration_since(started))
            .unwrap_or(Duration::ZERO);

        DegradationStats {
            tier: state.tier,
            is_degraded: state.tier.is_degraded(),
            should_shed_load: state.tier.sheds_load(),
            pool_utilization_pct: state.utilization_pct,
            pool_used: state.used,
            pool_free: state.free,
            pool_max: state.max,
            queue_depth: state.queue_depth,
            queue_max_size: self.config.queue_max_size,
            requests_queued_total: state.requests_queued_total,
            requests_shed_total: state.requests_shed_total,
            queue_timeouts_total: state.queue_timeouts_total,
            degraded_since: state.degraded_since,
            total_degraded_secs: state.total_degraded.as_secs_f64(),
            current_degraded_secs: current_degraded.as_secs_f64(),
        }
    }

    fn release(&self) {
        let mut state = self.lock();
        state.queue_depth = state.queue_depth.saturating_sub(1);
    }

    fn lock(&self) -> MutexGuard<'_, DegradationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for PoolDegradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolDegradation")
            .field("config", &self.config)
            .field("tier", &self.tier())
            .finish()
    }
}

/// A held slot in the pool admission gate.
///
/// Dropping the guard frees the slot.
#[must_use = "the admission slot is released as soon as the guard is dropped"]
pub struct AdmissionGuard<'a> {
    manager: &'a PoolDegradation,
}

impl fmt::Debug for AdmissionGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionGuard").finish_non_exhaustive()
    }
}

impl Drop for AdmissionGuard<'_> {
    fn drop(&mut self) {
        self.manager.release();
    }
}
