//! PoolStateMonitor - Background feed from a pool probe into `PoolDegradation`.
//!
//! Samples the probe on a fixed interval and pushes the counts into the
//! degradation manager. A failed sample keeps the previous tier; the loop
//! itself only stops on the shutdown signal.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `probe_interval` | 1s | How often the pool is sampled |

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::domain::pool_degradation::{DegradationTier, PoolDegradation};
use crate::ports::{PoolHealthProbe, PoolProbeError};

/// Background service feeding pool occupancy into the degradation manager.
pub struct PoolStateMonitor {
    probe: Arc<dyn PoolHealthProbe>,
    degradation: Arc<PoolDegradation>,
    probe_interval: Duration,
}

impl PoolStateMonitor {
    /// Create a monitor sampling every second.
    pub fn new(probe: Arc<dyn PoolHealthProbe>, degradation: Arc<PoolDegradation>) -> Self {
        Self::with_interval(probe, degradation, Duration::from_secs(1))
    }

    /// Create a monitor with a custom sampling interval.
    pub fn with_interval(
        probe: Arc<dyn PoolHealthProbe>,
        degradation: Arc<PoolDegradation>,
        probe_interval: Duration,
    ) -> Self {
        Self {
            probe,
            degradation,
            probe_interval,
        }
    }

    /// Run the sampling loop until shutdown signal is received.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.probe_interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::debug!("Pool state monitor stopping");
                        return;
                    }
                }

                _ = interval.tick() => {
                    if let Err(e) = self.poll_once().await {
                        tracing::warn!(error = %e, "Pool health probe failed");
                    }
                }
            }
        }
    }

    /// Take one sample and apply it.
    pub async fn poll_once(&self) -> Result<DegradationTier, PoolProbeError> {
        let snapshot = self.probe.sample().await?;
        Ok(self
            .degradation
            .update_pool_state(snapshot.used, snapshot.free, snapshot.max))
    }
}
