//! # Circuit Breaker Implementation
//!
//! Fault isolation for the service's outbound dependencies. Each breaker is a
//! three-state machine: Closed (normal operation), Open (failing fast) and
//! Half-Open (probing for recovery). All transitions for one breaker happen
//! under a single mutex; call outcomes are reported through a [`CallPermit`]
//! so that a probe abandoned mid-flight frees its slot.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::resilience::metrics::MetricsRecorder;
use crate::resilience::{CircuitBreakerConfig, CircuitBreakerMetrics};

/// Circuit breaker states representing the current operational mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Normal operation - all calls are allowed through
    Closed,
    /// Failure mode - all calls fail fast without executing
    Open,
    /// Testing recovery - one probe call at a time
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "CLOSED",
            CircuitState::Open => "OPEN",
            CircuitState::HalfOpen => "HALF_OPEN",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during circuit breaker operation
#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    /// Circuit is open, rejecting all calls
    #[error("Circuit breaker is open for {component}")]
    CircuitOpen { component: String },

    /// Operation failed and was recorded
    #[error("Operation failed: {0}")]
    OperationFailed(E),
}

/// Read-only snapshot of one breaker, as reported by the health endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyHealth {
    pub name: String,
    pub state: CircuitState,
    /// Failures counted toward the threshold in the current window
    pub failure_count: u32,
    pub last_failure_at: Option<DateTime<Utc>>,
    pub opened_at: Option<DateTime<Utc>>,
    pub metrics: CircuitBreakerMetrics,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    window_started_at: Option<Instant>,
    last_failure_at: Option<DateTime<Utc>>,
    opened_at: Option<Instant>,
    opened_at_wall: Option<DateTime<Utc>>,
    half_open_successes: u32,
    probe_in_flight: bool,
}

impl BreakerState {
    fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            window_started_at: None,
            last_failure_at: None,
            opened_at: None,
            opened_at_wall: None,
            half_open_successes: 0,
            probe_in_flight: false,
        }
    }
}

/// Per-dependency circuit breaker
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Component name for logging and health reporting
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
    metrics: MetricsRecorder,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given name and configuration
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let name = name.into();
        info!(
            component = %name,
            failure_threshold = config.failure_threshold,
            failure_window_seconds = config.failure_window.as_secs(),
            cooldown_seconds = config.cooldown.as_secs(),
            success_threshold = config.success_threshold,
            "🛡️ Circuit breaker initialized"
        );

        Self {
            name,
            config,
            inner: Mutex::new(BreakerState::closed()),
            metrics: MetricsRecorder::default(),
        }
    }

    /// Get current circuit state
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Execute an operation with circuit breaker protection
    pub async fn call<F, T, E, Fut>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let permit = self.try_acquire().ok_or_else(|| CircuitBreakerError::CircuitOpen {
            component: self.name.clone(),
        })?;

        let start_time = Instant::now();
        let result = operation().await;
        let duration = start_time.elapsed();

        match &result {
            Ok(_) => permit.record_success(duration),
            Err(_) => permit.record_failure(duration),
        }

        result.map_err(CircuitBreakerError::OperationFailed)
    }

    /// Admit a call, or `None` when the breaker rejects it
    pub fn try_acquire(&self) -> Option<CallPermit<'_>> {
        let mut inner = self.inner.lock();
        let admitted = match inner.state {
            CircuitState::Closed => Some(false),
            CircuitState::Open => {
                let cooled_down = inner
                    .opened_at
                    .map(|opened| opened.elapsed() >= self.config.cooldown)
                    .unwrap_or(true);
                if cooled_down {
                    self.transition_to_half_open(&mut inner);
                    inner.probe_in_flight = true;
                    Some(true)
                } else {
                    None
                }
            }
            CircuitState::HalfOpen => {
                if inner.probe_in_flight {
                    None
                } else {
                    inner.probe_in_flight = true;
                    Some(true)
                }
            }
        };
        drop(inner);

        match admitted {
            Some(probe) => Some(CallPermit {
                breaker: self,
                probe,
                settled: false,
            }),
            None => {
                self.metrics.record_rejection();
                debug!(component = %self.name, "⛔ Call rejected by open circuit");
                None
            }
        }
    }

    fn on_success(&self, probe: bool, duration: Duration) {
        self.metrics.record_success(duration);
        debug!(
            component = %self.name,
            duration_ms = duration.as_millis() as u64,
            "🟢 Operation succeeded"
        );

        let mut inner = self.inner.lock();
        if probe {
            inner.probe_in_flight = false;
        }
        match inner.state {
            CircuitState::Closed => {
                inner.failure_count = 0;
                inner.window_started_at = None;
            }
            CircuitState::HalfOpen if probe => {
                inner.half_open_successes += 1;
                if inner.half_open_successes >= self.config.success_threshold {
                    self.transition_to_closed(&mut inner);
                }
            }
            // The state moved under this call (forced transition); the
            // outcome no longer applies.
            CircuitState::HalfOpen | CircuitState::Open => {}
        }
    }

    fn on_failure(&self, probe: bool, duration: Duration) {
        self.metrics.record_failure(duration);
        warn!(
            component = %self.name,
            duration_ms = duration.as_millis() as u64,
            "🔴 Operation failed"
        );

        let mut inner = self.inner.lock();
        inner.last_failure_at = Some(Utc::now());
        if probe {
            inner.probe_in_flight = false;
        }
        match inner.state {
            CircuitState::Closed => {
                let window_expired = inner
                    .window_started_at
                    .map(|started| started.elapsed() > self.config.failure_window)
                    .unwrap_or(true);
                if window_expired {
                    inner.failure_count = 0;
                    inner.window_started_at = Some(Instant::now());
                }
                inner.failure_count += 1;
                if inner.failure_count >= self.config.failure_threshold {
                    self.transition_to_open(&mut inner);
                }
            }
            CircuitState::HalfOpen if probe => self.transition_to_open(&mut inner),
            CircuitState::HalfOpen | CircuitState::Open => {}
        }
    }

    fn on_abandoned(&self) {
        let mut inner = self.inner.lock();
        inner.probe_in_flight = false;
        debug!(component = %self.name, "Probe abandoned before completion");
    }

    fn transition_to_closed(&self, inner: &mut BreakerState) {
        *inner = BreakerState {
            last_failure_at: inner.last_failure_at,
            ..BreakerState::closed()
        };
        info!(component = %self.name, "🟢 Circuit breaker closed (recovered)");
    }

    fn transition_to_open(&self, inner: &mut BreakerState) {
        inner.state = CircuitState::Open;
        inner.opened_at = Some(Instant::now());
        inner.opened_at_wall = Some(Utc::now());
        inner.half_open_successes = 0;
        inner.probe_in_flight = false;

        error!(
            component = %self.name,
            failure_count = inner.failure_count,
            failure_threshold = self.config.failure_threshold,
            cooldown_seconds = self.config.cooldown.as_secs(),
            "🔴 Circuit breaker opened (failing fast)"
        );
    }

    fn transition_to_half_open(&self, inner: &mut BreakerState) {
        inner.state = CircuitState::HalfOpen;
        inner.half_open_successes = 0;
        inner.probe_in_flight = false;

        info!(
            component = %self.name,
            success_threshold = self.config.success_threshold,
            "🟡 Circuit breaker half-open (testing recovery)"
        );
    }

    /// Force circuit to open state (for emergency situations)
    pub fn force_open(&self) {
        warn!(component = %self.name, "🚨 Circuit breaker forced open");
        let mut inner = self.inner.lock();
        self.transition_to_open(&mut inner);
    }

    /// Force circuit to closed state (for emergency recovery)
    pub fn force_closed(&self) {
        warn!(component = %self.name, "🚨 Circuit breaker forced closed");
        let mut inner = self.inner.lock();
        self.transition_to_closed(&mut inner);
    }

    /// Get current metrics snapshot
    pub fn metrics(&self) -> CircuitBreakerMetrics {
        self.metrics.snapshot(self.state())
    }

    /// Side-effect free view of the breaker for health reporting
    pub fn snapshot(&self) -> DependencyHealth {
        let (state, failure_count, last_failure_at, opened_at) = {
            let inner = self.inner.lock();
            (
                inner.state,
                inner.failure_count,
                inner.last_failure_at,
                inner.opened_at_wall,
            )
        };

        DependencyHealth {
            name: self.name.clone(),
            state,
            failure_count,
            last_failure_at,
            opened_at,
            metrics: self.metrics.snapshot(state),
        }
    }
}

/// Admission ticket for one call through a [`CircuitBreaker`]
///
/// Dropping a permit without recording an outcome releases a half-open probe
/// slot without counting a success or failure.
#[must_use = "record the outcome of the admitted call"]
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    probe: bool,
    settled: bool,
}

impl CallPermit<'_> {
    pub fn is_probe(&self) -> bool {
        self.probe
    }

    pub fn record_success(mut self, duration: Duration) {
        self.settled = true;
        self.breaker.on_success(self.probe, duration);
    }

    pub fn record_failure(mut self, duration: Duration) {
        self.settled = true;
        self.breaker.on_failure(self.probe, duration);
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.probe {
            self.breaker.on_abandoned();
        }
    }
}
