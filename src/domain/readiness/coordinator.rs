//! Readiness coordinator for concurrently running sub-problems.
//!
//! Every read and write goes through one `tokio::sync::Mutex`. Latches are
//! `watch` channels holding `false` until signaled; they are only ever set to
//! `true`. Waiters subscribe under the lock and await outside it, so other
//! sub-problems keep making progress while a dependent is parked.

use std::collections::BTreeMap;
use std::time::Duration;

use futures::future::try_join_all;
use tokio::sync::{watch, Mutex};

use super::config::ReadinessConfig;
use super::context::PartialContext;
use super::progress::SubProblemProgress;

#[derive(Debug, Clone, Copy)]
enum Latch {
    Ready,
    Complete,
}

impl Latch {
    fn as_str(&self) -> &'static str {
        match self {
            Latch::Ready => "ready",
            Latch::Complete => "complete",
        }
    }
}

#[derive(Debug)]
struct Entry {
    progress: SubProblemProgress,
    ready: watch::Sender<bool>,
    complete: watch::Sender<bool>,
}

impl Entry {
    fn new(progress: SubProblemProgress) -> Self {
        let (ready, _) = watch::channel(false);
        let (complete, _) = watch::channel(false);
        Self {
            progress,
            ready,
            complete,
        }
    }

    fn latch(&self, latch: Latch) -> &watch::Sender<bool> {
        match latch {
            Latch::Ready => &self.ready,
            Latch::Complete => &self.complete,
        }
    }
}

/// Signals a latch. Returns true if this call flipped it.
fn signal(latch: &watch::Sender<bool>) -> bool {
    !latch.send_replace(true)
}

/// Dependency-gated speculative start for sub-problems.
///
/// Scoped to one deliberation; records live as long as the coordinator.
#[derive(Debug)]
pub struct ReadinessCoordinator {
    config: ReadinessConfig,
    entries: Mutex<BTreeMap<usize, Entry>>,
}

impl ReadinessCoordinator {
    /// Creates an empty coordinator.
    pub fn new(config: ReadinessConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Creates a coordinator with the default early-start threshold.
    pub fn with_defaults() -> Self {
        Self::new(ReadinessConfig::default())
    }

    /// Rounds a sub-problem must complete before dependents may start.
    pub fn early_start_threshold(&self) -> u32 {
        self.config.early_start_threshold
    }

    /// Registers a sub-problem and creates its two latches.
    ///
    /// Registering an index again replaces its record and latches; tasks
    /// still waiting on the old latches give up and return false.
    pub async fn register(
        &self,
        index: usize,
        id: impl Into<String>,
        goal: impl Into<String>,
        max_rounds: u32,
        expert_panel: Vec<String>,
    ) {
        let progress = SubProblemProgress::new(index, id, goal, max_rounds, expert_panel);
        let mut entries = self.entries.lock().await;
        tracing::debug!(index, id = %progress.id, max_rounds, "Sub-problem registered");
        if entries.insert(index, Entry::new(progress)).is_some() {
            tracing::warn!(index, "Sub-problem registered twice; previous progress discarded");
        }
    }

    /// Records a finished round and fires "ready" once the threshold is met.
    ///
    /// Unknown indices are logged and ignored.
    pub async fn update_round(
        &self,
        index: usize,
        round_num: u32,
        summary: impl Into<String>,
        insights: Vec<String>,
    ) {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(&index) else {
            tracing::warn!(index, round_num, "Round update for unregistered sub-problem ignored");
            return;
        };

        entry.progress.record_round(round_num, summary.into(), insights);
        if round_num >= self.config.early_start_threshold && signal(&entry.ready) {
            tracing::info!(
                index,
                round_num,
                threshold = self.config.early_start_threshold,
                "Sub-problem ready for dependents"
            );
        }
    }

    /// Stores final outputs and fires both latches.
    ///
    /// Unknown indices are logged and ignored.
    pub async fn mark_complete(
        &self,
        index: usize,
        synthesis: impl Into<String>,
        recommendation: Option<String>,
    ) {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(&index) else {
            tracing::warn!(index, "Completion for unregistered sub-problem ignored");
            return;
        };

        entry.progress.complete(synthesis.into(), recommendation);
        signal(&entry.ready);
        signal(&entry.complete);
        tracing::info!(index, "Sub-problem complete");
    }

    /// Waits until every dependency is ready, or the timeout expires.
    ///
    /// Returns true immediately for an empty list.
    pub async fn wait_ready(&self, dependencies: &[usize], timeout: Option<Duration>) -> bool {
        self.wait_for(dependencies, timeout, Latch::Ready).await
    }

    /// Waits until every dependency is complete, or the timeout expires.
    ///
    /// Returns true immediately for an empty list.
    pub async fn wait_complete(&self, dependencies: &[usize], timeout: Option<Duration>) -> bool {
        self.wait_for(dependencies, timeout, Latch::Complete).await
    }

    /// Snapshot of the listed dependencies with prompt-ready text.
    ///
    /// Advisory only: never blocks on the latches.
    pub async fn get_partial_context(&self, index: usize, dependencies: &[usize]) -> PartialContext {
        let snapshots = {
            let entries = self.entries.lock().await;
            dependencies
                .iter()
                .map(|dep| (*dep, entries.get(dep).map(|entry| entry.progress.clone())))
                .collect::<Vec<_>>()
        };

        let context = PartialContext::build(snapshots, &self.config);
        tracing::debug!(
            index,
            dependencies = dependencies.len(),
            all_ready = context.all_ready,
            all_complete = context.all_complete,
            "Partial context built"
        );
        context
    }

    /// Progress of every registered sub-problem, ordered by index.
    pub async fn get_all_progress(&self) -> Vec<SubProblemProgress> {
        self.entries
            .lock()
            .await
            .values()
            .map(|entry| entry.progress.clone())
            .collect()
    }

    /// Whether the sub-problem's "ready" latch has fired.
    pub async fn is_ready(&self, index: usize) -> bool {
        self.entries
            .lock()
            .await
            .get(&index)
            .map(|entry| *entry.ready.borrow())
            .unwrap_or(false)
    }

    /// Whether the sub-problem's "complete" latch has fired.
    pub async fn is_complete(&self, index: usize) -> bool {
        self.entries
            .lock()
            .await
            .get(&index)
            .map(|entry| *entry.complete.borrow())
            .unwrap_or(false)
    }

    async fn wait_for(&self, dependencies: &[usize], timeout: Option<Duration>, latch: Latch) -> bool {
        if dependencies.is_empty() {
            return true;
        }

        let receivers = {
            let entries = self.entries.lock().await;
            let mut receivers = Vec::with_capacity(dependencies.len());
            for dep in dependencies {
                match entries.get(dep) {
                    Some(entry) => receivers.push(entry.latch(latch).subscribe()),
                    None => {
                        tracing::warn!(
                            dependency = *dep,
                            latch = latch.as_str(),
                            "Waiting on unregistered sub-problem; giving up"
                        );
                        return false;
                    }
                }
            }
            receivers
        };

        // A closed channel means the dependency was re-registered under us;
        // the first one fails the whole wait without waiting on the rest.
        let all_signaled = async move {
            try_join_all(
                receivers
                    .into_iter()
                    .map(|mut rx| async move { rx.wait_for(|fired| *fired).await.map(|_| ()) }),
            )
            .await
            .is_ok()
        };

        match timeout {
            Some(limit) => match tokio::time::timeout(limit, all_signaled).await {
                Ok(signaled) => signaled,
                Err(_) => {
                    tracing::debug!(
                        ?dependencies,
                        latch = latch.as_str(),
                        timeout_ms = limit.as_millis() as u64,
                        "Dependency wait timed out"
                    );
                    false
                }
            },
            None => all_signaled.await,
        }
    }
}
