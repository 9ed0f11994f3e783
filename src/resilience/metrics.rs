//! # Circuit Breaker Metrics
//!
//! Lock-free call counters kept by every circuit breaker, and the serializable
//! snapshot the health endpoint reports.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::circuit_breaker::CircuitState;

/// Point-in-time view of a breaker's call counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitBreakerMetrics {
    /// Calls that reached the protected dependency
    pub total_calls: u64,
    pub success_count: u64,
    pub total_failures: u64,
    /// Calls rejected without reaching the dependency
    pub rejected_calls: u64,
    pub current_state: CircuitState,
    pub failure_rate: f64,
    pub success_rate: f64,
    #[serde(with = "duration_millis")]
    pub average_duration: Duration,
}

#[derive(Debug, Default)]
pub(crate) struct MetricsRecorder {
    total_calls: AtomicU64,
    success_count: AtomicU64,
    failure_count: AtomicU64,
    rejected_count: AtomicU64,
    total_duration_micros: AtomicU64,
}

impl MetricsRecorder {
    pub(crate) fn record_success(&self, duration: Duration) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        self.success_count.fetch_add(1, Ordering::Relaxed);
        self.add_duration(duration);
    }

    pub(crate) fn record_failure(&self, duration: Duration) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        self.failure_count.fetch_add(1, Ordering::Relaxed);
        self.add_duration(duration);
    }

    pub(crate) fn record_rejection(&self) {
        self.rejected_count.fetch_add(1, Ordering::Relaxed);
    }

    fn add_duration(&self, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self.total_duration_micros.fetch_add(micros, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, current_state: CircuitState) -> CircuitBreakerMetrics {
        let total_calls = self.total_calls.load(Ordering::Relaxed);
        let success_count = self.success_count.load(Ordering::Relaxed);
        let total_failures = self.failure_count.load(Ordering::Relaxed);
        let rejected_calls = self.rejected_count.load(Ordering::Relaxed);
        let total_micros = self.total_duration_micros.load(Ordering::Relaxed);

        let (failure_rate, success_rate, average_duration) = if total_calls > 0 {
            (
                total_failures as f64 / total_calls as f64,
                success_count as f64 / total_calls as f64,
                Duration::from_micros(total_micros / total_calls),
            )
        } else {
            (0.0, 0.0, Duration::ZERO)
        };

        CircuitBreakerMetrics {
            total_calls,
            success_count,
            total_failures,
            rejected_calls,
            current_state,
            failure_rate,
            success_rate,
            average_duration,
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
