//! # Circuit Breaker
//!
//! One breaker per [`Gateway`](crate::Gateway). It counts consecutive
//! failures; at the threshold it opens and rejects every call until the retry
//! window has elapsed since it opened. The first call after that is a
//! half-open probe and is the only one let through:
//!
//! ```text
//! Closed --(failures >= threshold)--> Open
//! Open   --(window elapsed)---------> one probe admitted
//! probe ok   --> Closed, counters and window reset
//! probe fail --> Open again, window doubled (capped)
//! ```
//!
//! Every opening doubles the window, so the first one lasts twice the
//! initial delay. A success from a call admitted before the trip does not
//! close the circuit; only the probe can.
//!
//! All transitions happen under a mutex that is never held across an
//! `.await`, so a multi-threaded runtime sees them atomically.

use crate::config::BreakerConfig;
use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Externally visible breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CircuitState {
    Closed,
    Open,
}

/// Point-in-time copy of the breaker's counters.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitSnapshot {
    pub state: CircuitState,
    pub failure_count: u32,
    /// When the failure that tripped the breaker happened.
    pub opened_at: Option<Instant>,
    pub next_retry_delay: Duration,
}

/// How a call got through [`CircuitBreaker::admit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionKind {
    Normal,
    Probe,
}

/// Ticket returned by [`CircuitBreaker::admit`].
///
/// Settle it with [`succeed`](Admission::succeed) or [`fail`](Admission::fail).
/// Dropping it unsettled (the call was cancelled, timed out, or its task was
/// aborted) hands a probe slot back without counting either way.
#[must_use = "an unsettled admission is released on drop"]
pub struct Admission<'a> {
    breaker: &'a CircuitBreaker,
    kind: AdmissionKind,
    settled: bool,
}

impl Admission<'_> {
    pub fn kind(&self) -> AdmissionKind {
        self.kind
    }

    pub fn is_probe(&self) -> bool {
        self.kind == AdmissionKind::Probe
    }

    pub fn succeed(mut self) {
        self.settled = true;
        self.breaker.record_success(self.kind);
    }

    pub fn fail(mut self) {
        self.settled = true;
        self.breaker.record_failure(self.kind);
    }
}

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.release(self.kind);
        }
    }
}

impl std::fmt::Debug for Admission<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Admission")
            .field("kind", &self.kind)
            .field("settled", &self.settled)
            .finish()
    }
}

#[derive(Debug)]
struct BreakerState {
    failure_count: u32,
    open: bool,
    opened_at: Option<Instant>,
    next_retry_delay: Duration,
    probe_in_flight: bool,
}

impl BreakerState {
    fn open_now(&mut self, max_retry_delay: Duration) {
        self.next_retry_delay = self.next_retry_delay.saturating_mul(2).min(max_retry_delay);
        self.open = true;
        self.opened_at = Some(Instant::now());
    }
}

#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(config: BreakerConfig) -> Self {
        let state = BreakerState {
            failure_count: 0,
            open: false,
            opened_at: None,
            next_retry_delay: config.initial_retry_delay(),
            probe_in_flight: false,
        };
        Self {
            config,
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn admission(&self, kind: AdmissionKind) -> Admission<'_> {
        Admission {
            breaker: self,
            kind,
            settled: false,
        }
    }

    /// Decides whether a call may go out now.
    pub fn admit(&self) -> Result<Admission<'_>, GatewayError> {
        let mut state = self.lock();
        if !state.open {
            return Ok(self.admission(AdmissionKind::Normal));
        }

        let now = Instant::now();
        let opened_at = state.opened_at.unwrap_or(now);
        let elapsed = now.saturating_duration_since(opened_at);
        if elapsed < state.next_retry_delay {
            let retry_in = state.next_retry_delay - elapsed;
            debug!(?retry_in, "Circuit open, rejecting call");
            return Err(GatewayError::CircuitOpen { retry_in });
        }
        if state.probe_in_flight {
            debug!("Probe already in flight, rejecting call");
            return Err(GatewayError::CircuitOpen {
                retry_in: Duration::ZERO,
            });
        }

        state.probe_in_flight = true;
        info!(failure_count = state.failure_count, "Circuit half-open, sending probe");
        Ok(self.admission(AdmissionKind::Probe))
    }

    fn record_success(&self, kind: AdmissionKind) {
        let mut state = self.lock();
        if state.open && kind == AdmissionKind::Normal {
            debug!("Late success while open, ignored");
            return;
        }
        if state.open || state.failure_count > 0 {
            info!(?kind, failures = state.failure_count, "Circuit closed");
        }
        state.failure_count = 0;
        state.open = false;
        state.opened_at = None;
        state.probe_in_flight = false;
        state.next_retry_delay = self.config.initial_retry_delay();
    }

    fn record_failure(&self, kind: AdmissionKind) {
        let mut state = self.lock();
        state.failure_count = state.failure_count.saturating_add(1);

        match kind {
            AdmissionKind::Probe => {
                state.open_now(self.config.max_retry_delay());
                state.probe_in_flight = false;
                warn!(
                    next_retry_delay = ?state.next_retry_delay,
                    "Probe failed, circuit reopened"
                );
            }
            AdmissionKind::Normal => {
                if !state.open && state.failure_count >= self.config.failure_threshold {
                    state.open_now(self.config.max_retry_delay());
                    warn!(
                        failures = state.failure_count,
                        next_retry_delay = ?state.next_retry_delay,
                        "Circuit opened"
                    );
                } else {
                    debug!(failures = state.failure_count, "Call failed");
                }
            }
        }
    }

    /// An unsettled call leaves the counters alone.
    fn release(&self, kind: AdmissionKind) {
        if kind == AdmissionKind::Probe {
            debug!("Probe abandoned, slot released");
            self.lock().probe_in_flight = false;
        }
    }

    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        let state = self.lock();
        CircuitSnapshot {
            state: if state.open {
                CircuitState::Open
            } else {
                CircuitState::Closed
            },
            failure_count: state.failure_count,
            opened_at: state.opened_at,
            next_retry_delay: state.next_retry_delay,
        }
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }
}
