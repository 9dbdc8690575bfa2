//! Per-session sliding-window state.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::domain::foundation::Timestamp;

/// Call history and round high-water mark for one session.
///
/// `call_times` stays sorted ascending because instants are only ever
/// appended while the limiter lock is held.
#[derive(Debug, Clone)]
pub struct SessionRateState {
    call_times: VecDeque<Instant>,
    max_round_seen: u32,
    last_activity: Instant,
    last_activity_at: Timestamp,
}

impl SessionRateState {
    /// Creates empty state for a session first seen at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            call_times: VecDeque::new(),
            max_round_seen: 0,
            last_activity: now,
            last_activity_at: Timestamp::now(),
        }
    }

    /// Marks the session as active.
    pub fn touch(&mut self, now: Instant) {
        self.last_activity = now;
        self.last_activity_at = Timestamp::now();
    }

    /// Drops calls that left the trailing window ending at `now`.
    pub fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.call_times.front() {
            if now.saturating_duration_since(oldest) >= window {
                self.call_times.pop_front();
            } else {
                break;
            }
        }
    }

    /// Counts calls inside the trailing window without pruning.
    pub fn calls_in_window(&self, now: Instant, window: Duration) -> usize {
        self.call_times
            .iter()
            .filter(|&&t| now.saturating_duration_since(t) < window)
            .count()
    }

    /// Appends a call at `now`.
    pub fn push_call(&mut self, now: Instant) {
        self.call_times.push_back(now);
    }

    /// Number of recorded calls (pruned or not).
    pub fn recorded_calls(&self) -> usize {
        self.call_times.len()
    }

    /// Oldest recorded call.
    pub fn oldest_call(&self) -> Option<Instant> {
        self.call_times.front().copied()
    }

    /// Raises the round high-water mark.
    pub fn observe_round(&mut self, round_number: u32) {
        self.max_round_seen = self.max_round_seen.max(round_number);
    }

    /// Highest round number ever checked for this session.
    pub fn max_round_seen(&self) -> u32 {
        self.max_round_seen
    }

    /// Time since the session last did anything.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    /// Wall-clock time of the last activity.
    pub fn last_activity_at(&self) -> Timestamp {
        self.last_activity_at
    }
}
