//! Sliding-window LLM call limiter with a hard round cap.
//!
//! Shared by OS threads and async tasks alike, so the state sits behind a
//! `std::sync::Mutex`. Every operation is bounded by the number of calls in
//! one window and never touches I/O while the lock is held.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

use super::config::RateAdmissionConfig;
use super::session_state::SessionRateState;

/// Outcome of a sliding-window call check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallDecision {
    /// The call was admitted and recorded.
    Allowed,
    /// The window is full; the oldest call frees a slot after `wait`.
    Throttled { wait: Duration },
}

impl CallDecision {
    /// Returns true if the call was admitted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, CallDecision::Allowed)
    }

    /// Returns true if the call was throttled.
    pub fn is_throttled(&self) -> bool {
        matches!(self, CallDecision::Throttled { .. })
    }

    /// Suggested wait before retrying. Zero when allowed.
    pub fn wait(&self) -> Duration {
        match self {
            CallDecision::Allowed => Duration::ZERO,
            CallDecision::Throttled { wait } => *wait,
        }
    }
}

/// Introspection snapshot for one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRateStats {
    pub session_id: String,
    /// Calls inside the current trailing window.
    pub calls_in_window: usize,
    /// Calls still available in the current window.
    pub remaining_calls: usize,
    pub max_calls_per_window: u32,
    pub window_secs: u64,
    pub max_round_seen: u32,
    pub max_rounds: u32,
    pub last_activity_at: Timestamp,
    pub idle_secs: f64,
}

#[derive(Debug)]
struct LimiterState {
    sessions: HashMap<String, SessionRateState>,
    last_cleanup: Instant,
}

/// Per-session LLM call and round limiter.
///
/// Construct once at startup and share by `Arc`.
pub struct RateAdmission {
    config: RateAdmissionConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<LimiterState>,
}

impl RateAdmission {
    /// Create a limiter reading time from `clock`.
    pub fn new(config: RateAdmissionConfig, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            config,
            clock,
            state: Mutex::new(LimiterState {
                sessions: HashMap::new(),
                last_cleanup: now,
            }),
        }
    }

    /// Active limits.
    pub fn config(&self) -> &RateAdmissionConfig {
        &self.config
    }

    /// Whether limiting is switched on.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Check whether a session may run `round_number`.
    ///
    /// Raises the session's round high-water mark either way. Returns false
    /// only when `round_number` exceeds the configured cap.
    pub fn check_round_limit(&self, session_id: &str, round_number: u32) -> bool {
        if !self.config.enabled {
            return true;
        }

        let mut state = self.lock();
        let now = self.clock.now();
        self.sweep_if_due(&mut state, now);

        let session = state
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionRateState::new(now));
        session.observe_round(round_number);
        session.touch(now);

        let allowed = round_number <= self.config.max_rounds;
        if !allowed {
            tracing::warn!(
                session_id,
                round_number,
                max_rounds = self.config.max_rounds,
                "Session exceeded deliberation round cap"
            );
        }
        allowed
    }

    /// Sliding-window check for one model call.
    ///
    /// Records the call when allowed. When throttled, `wait` is the time
    /// until the oldest call in the window expires, so `0 < wait <= window`.
    pub fn check_call_rate(&self, session_id: &str) -> CallDecision {
        if !self.config.enabled {
            return CallDecision::Allowed;
        }

        let window = self.config.window();
        let mut state = self.lock();
        let now = self.clock.now();
        self.sweep_if_due(&mut state, now);

        let session = state
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionRateState::new(now));
        session.prune(now, window);
        session.touch(now);

        if session.recorded_calls() < self.config.max_calls_per_window as usize {
            session.push_call(now);
            return CallDecision::Allowed;
        }

        let wait = session
            .oldest_call()
            .map(|oldest| window.saturating_sub(now.saturating_duration_since(oldest)))
            .unwrap_or(window);
        tracing::debug!(
            session_id,
            wait_secs = wait.as_secs_f64(),
            "LLM call throttled"
        );
        CallDecision::Throttled { wait }
    }

    /// Record a call without checking the window.
    ///
    /// For callers that already slept the suggested wait.
    pub fn record_call(&self, session_id: &str) {
        if !self.config.enabled {
            return;
        }

        let window = self.config.window();
        let mut state = self.lock();
        let now = self.clock.now();

        let session = state
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionRateState::new(now));
        session.prune(now, window);
        session.push_call(now);
        session.touch(now);
    }

    /// Remove every session idle for longer than `window × cleanup_multiplier`.
    ///
    /// Returns the number of sessions removed.
    pub fn cleanup_stale(&self) -> usize {
        let mut state = self.lock();
        let now = self.clock.now();
        self.sweep(&mut state, now)
    }

    /// Run [`cleanup_stale`](Self::cleanup_stale) at most once per cleanup interval.
    pub fn maybe_cleanup(&self) -> usize {
        let mut state = self.lock();
        let now = self.clock.now();
        self.sweep_if_due(&mut state, now)
    }

    /// Snapshot of one session, if it is tracked.
    pub fn stats(&self, session_id: &str) -> Option<SessionRateStats> {
        let state = self.lock();
        let now = self.clock.now();
        let window = self.config.window();

        state.sessions.get(session_id).map(|session| {
            let calls_in_window = session.calls_in_window(now, window);
            SessionRateStats {
                session_id: session_id.to_string(),
                calls_in_window,
                remaining_calls: (self.config.max_calls_per_window as usize)
                    .saturating_sub(calls_in_window),
                max_calls_per_window: self.config.max_calls_per_window,
                window_secs: self.config.window_secs,
                max_round_seen: session.max_round_seen(),
                max_rounds: self.config.max_rounds,
                last_activity_at: session.last_activity_at(),
                idle_secs: session.idle_for(now).as_secs_f64(),
            }
        })
    }

    /// Forget a session entirely.
    ///
    /// Used when a session resumes from a checkpoint so earlier attempts do
    /// not count against it. Returns whether the session was tracked.
    pub fn reset(&self, session_id: &str) -> bool {
        let removed = self.lock().sessions.remove(session_id).is_some();
        if removed {
            tracing::debug!(session_id, "Rate admission state reset");
        }
        removed
    }

    /// Number of sessions currently tracked.
    pub fn tracked_sessions(&self) -> usize {
        self.lock().sessions.len()
    }

    fn lock(&self) -> MutexGuard<'_, LimiterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sweep_if_due(&self, state: &mut LimiterState, now: Instant) -> usize {
        if now.saturating_duration_since(state.last_cleanup) < self.config.cleanup_interval() {
            return 0;
        }
        self.sweep(state, now)
    }

    fn sweep(&self, state: &mut LimiterState, now: Instant) -> usize {
        let stale_after = self.config.stale_after();
        let before = state.sessions.len();
        state
            .sessions
            .retain(|_, session| session.idle_for(now) <= stale_after);
        state.last_cleanup = now;

        let removed = before - state.sessions.len();
        if removed > 0 {
            tracing::info!(
                removed,
                remaining = state.sessions.len(),
                "Swept stale rate admission sessions"
            );
        }
        removed
    }
}

impl fmt::Debug for RateAdmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateAdmission")
            .field("config", &self.config)
            .field("tracked_sessions", &self.tracked_sessions())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::test_clock::StepClock;
    use proptest::prelude::*;

    fn limiter_with_clock(config: RateAdmissionConfig) -> (RateAdmission, Arc<StepClock>) {
        let clock = Arc::new(StepClock::new());
        (RateAdmission::new(config, clock.clone()), clock)
    }

    fn limiter(config: RateAdmissionConfig) -> RateAdmission {
        limiter_with_clock(config).0
    }

    // ─── Round Limit Tests ───────────────────────────────────────────

    #[test]
    fn round_limit_allows_up_to_cap() {
        let limiter = limiter(RateAdmissionConfig::default());
        assert!(limiter.check_round_limit("s1", 10));
        assert!(!limiter.check_round_limit("s1", 11));
    }

    #[test]
    fn max_round_seen_tracks_highest_round() {
        let limiter = limiter(RateAdmissionConfig::default());
        limiter.check_round_limit("s1", 3);
        limiter.check_round_limit("s1", 7);
        limiter.check_round_limit("s1", 5);

        let stats = limiter.stats("s1").unwrap();
        assert_eq!(stats.max_round_seen, 7);
    }

    #[test]
    fn max_round_seen_records_denied_rounds() {
        let limiter = limiter(RateAdmissionConfig::default());
        assert!(!limiter.check_round_limit("s1", 12));
        assert_eq!(limiter.stats("s1").unwrap().max_round_seen, 12);
    }

    // ─── Call Rate Tests ─────────────────────────────────────────────

    #[test]
    fn six_rapid_calls_allowed_seventh_throttled() {
        let (limiter, _clock) = limiter_with_clock(RateAdmissionConfig::default());

        for i in 0..6 {
            let decision = limiter.check_call_rate("s1");
            assert!(decision.is_allowed(), "call {} should pass", i + 1);
            assert_eq!(decision.wait(), Duration::ZERO);
        }

        let decision = limiter.check_call_rate("s1");
        assert!(decision.is_throttled());
        assert!(decision.wait() > Duration::ZERO);
        assert!(decision.wait() <= Duration::from_secs(60));
    }

    #[test]
    fn wait_counts_down_from_oldest_call() {
        let (limiter, clock) = limiter_with_clock(RateAdmissionConfig::default());

        limiter.check_call_rate("s1");
        clock.advance(Duration::from_secs(20));
        for _ in 0..5 {
            limiter.check_call_rate("s1");
        }

        let decision = limiter.check_call_rate("s1");
        assert_eq!(decision.wait(), Duration::from_secs(40));
    }

    #[test]
    fn throttled_session_recovers_after_wait() {
        let (limiter, clock) = limiter_with_clock(RateAdmissionConfig::default());
        for _ in 0..6 {
            limiter.check_call_rate("s1");
        }

        let decision = limiter.check_call_rate("s1");
        assert!(decision.is_throttled());

        clock.advance(decision.wait());
        assert!(limiter.check_call_rate("s1").is_allowed());
    }

    #[test]
    fn throttled_call_is_not_recorded() {
        let (limiter, _clock) = limiter_with_clock(RateAdmissionConfig::default());
        for _ in 0..8 {
            limiter.check_call_rate("s1");
        }
        assert_eq!(limiter.stats("s1").unwrap().calls_in_window, 6);
    }

    #[test]
    fn sessions_have_independent_windows() {
        let (limiter, _clock) = limiter_with_clock(RateAdmissionConfig::default());
        for _ in 0..6 {
            limiter.check_call_rate("s1");
        }
        assert!(limiter.check_call_rate("s1").is_throttled());
        assert!(limiter.check_call_rate("s2").is_allowed());
    }

    #[test]
    fn record_call_bypasses_the_cap() {
        let (limiter, _clock) = limiter_with_clock(RateAdmissionConfig::default());
        for _ in 0..6 {
            limiter.check_call_rate("s1");
        }
        limiter.record_call("s1");

        assert_eq!(limiter.stats("s1").unwrap().calls_in_window, 7);
        assert!(limiter.check_call_rate("s1").is_throttled());
    }

    // ─── Disabled Switch Tests ───────────────────────────────────────

    #[test]
    fn disabled_limiter_allows_everything_and_keeps_no_state() {
        let limiter = limiter(RateAdmissionConfig::disabled());

        for _ in 0..50 {
            assert!(limiter.check_call_rate("s1").is_allowed());
        }
        assert!(limiter.check_round_limit("s1", 1_000));
        limiter.record_call("s1");

        assert_eq!(limiter.tracked_sessions(), 0);
        assert!(limiter.stats("s1").is_none());
    }

    // ─── Cleanup Tests ───────────────────────────────────────────────

    #[test]
    fn cleanup_removes_only_stale_sessions() {
        let (limiter, clock) = limiter_with_clock(RateAdmissionConfig::default());
        limiter.check_call_rate("old");
        clock.advance(Duration::from_secs(200));
        limiter.check_call_rate("fresh");
        clock.advance(Duration::from_secs(101));

        assert_eq!(limiter.cleanup_stale(), 1);
        assert!(limiter.stats("old").is_none());
        assert!(limiter.stats("fresh").is_some());
    }

    #[test]
    fn session_idle_exactly_at_threshold_is_kept() {
        let (limiter, clock) = limiter_with_clock(RateAdmissionConfig::default());
        limiter.check_call_rate("s1");
        clock.advance(Duration::from_secs(300));

        assert_eq!(limiter.cleanup_stale(), 0);
        assert_eq!(limiter.tracked_sessions(), 1);
    }

    #[test]
    fn maybe_cleanup_is_time_gated() {
        let config = RateAdmissionConfig {
            cleanup_interval_secs: 600,
            ..Default::default()
        };
        let (limiter, clock) = limiter_with_clock(config);
        limiter.check_call_rate("s1");
        clock.advance(Duration::from_secs(400));

        assert_eq!(limiter.maybe_cleanup(), 0);
        assert_eq!(limiter.tracked_sessions(), 1);

        clock.advance(Duration::from_secs(200));
        assert_eq!(limiter.maybe_cleanup(), 1);
        assert_eq!(limiter.tracked_sessions(), 0);
    }

    #[test]
    fn checks_trigger_due_sweep() {
        let (limiter, clock) = limiter_with_clock(RateAdmissionConfig::default());
        limiter.check_call_rate("abandoned");
        clock.advance(Duration::from_secs(301));

        limiter.check_call_rate("active");

        assert!(limiter.stats("abandoned").is_none());
        assert_eq!(limiter.tracked_sessions(), 1);
    }

    // ─── Reset Tests ─────────────────────────────────────────────────

    #[test]
    fn reset_restores_full_quota() {
        let (limiter, _clock) = limiter_with_clock(RateAdmissionConfig::default());
        for _ in 0..6 {
            limiter.check_call_rate("s1");
        }
        assert!(limiter.check_call_rate("s1").is_throttled());

        assert!(limiter.reset("s1"));
        assert!(limiter.check_call_rate("s1").is_allowed());
        assert!(!limiter.reset("unknown"));
    }

    #[test]
    fn stats_report_remaining_calls() {
        let (limiter, _clock) = limiter_with_clock(RateAdmissionConfig::default());
        limiter.check_call_rate("s1");
        limiter.check_call_rate("s1");

        let stats = limiter.stats("s1").unwrap();
        assert_eq!(stats.calls_in_window, 2);
        assert_eq!(stats.remaining_calls, 4);
    }

    // ─── Properties ──────────────────────────────────────────────────

    proptest! {
        #[test]
        fn round_limit_matches_cap(max_rounds in 1u32..50, round in 0u32..100) {
            let config = RateAdmissionConfig { max_rounds, ..Default::default() };
            let limiter = limiter(config);
            prop_assert_eq!(limiter.check_round_limit("s", round), round <= max_rounds);
        }

        #[test]
        fn at_most_cap_calls_admitted_per_window(cap in 1u32..20, attempts in 1usize..60) {
            let config = RateAdmissionConfig { max_calls_per_window: cap, ..Default::default() };
            let (limiter, _clock) = limiter_with_clock(config);

            let admitted = (0..attempts)
                .filter(|_| limiter.check_call_rate("s").is_allowed())
                .count();
            prop_assert_eq!(admitted, attempts.min(cap as usize));
        }

        #[test]
        fn wait_is_within_window(offsets in proptest::collection::vec(0u64..59, 6)) {
            let (limiter, clock) = limiter_with_clock(RateAdmissionConfig::default());
            // Six steps of at most 9s keep every call inside one window.
            for offset in offsets {
                clock.advance(Duration::from_secs(offset / 6));
                limiter.check_call_rate("s");
            }

            let decision = limiter.check_call_rate("s");
            prop_assert!(decision.is_throttled());
            prop_assert!(decision.wait() > Duration::ZERO);
            prop_assert!(decision.wait() <= Duration::from_secs(60));
        }
    }
}
