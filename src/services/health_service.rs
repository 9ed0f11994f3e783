//! # Health Service
//!
//! Health check logic independent of the HTTP layer. Reads circuit breaker
//! snapshots from the [`DependencyHealthTracker`] and never calls a dependency,
//! so a health check can neither trip nor probe a breaker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use crate::resilience::{CircuitState, DependencyHealth, DependencyHealthTracker};

/// Aggregate service status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    /// Every tracked dependency is `CLOSED`
    Healthy,
    Degraded,
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverallStatus::Healthy => f.write_str("healthy"),
            OverallStatus::Degraded => f.write_str("degraded"),
        }
    }
}

/// `GET /health` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: OverallStatus,
    pub dependencies: BTreeMap<String, CircuitState>,
}

/// `GET /health/detailed` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedHealthReport {
    pub status: OverallStatus,
    pub version: String,
    pub environment: String,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
    pub dependencies: BTreeMap<String, DependencyHealth>,
}

#[derive(Debug, Clone)]
pub struct HealthService {
    tracker: DependencyHealthTracker,
    environment: String,
    start_time: Instant,
}

impl HealthService {
    pub fn new(tracker: DependencyHealthTracker, environment: impl Into<String>) -> Self {
        Self {
            tracker,
            environment: environment.into(),
            start_time: Instant::now(),
        }
    }

    pub fn tracker(&self) -> &DependencyHealthTracker {
        &self.tracker
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Aggregate status with the state of every dependency
    pub fn health(&self) -> HealthReport {
        let dependencies: BTreeMap<String, CircuitState> = self
            .tracker
            .report_all()
            .into_iter()
            .map(|(name, health)| (name.to_string(), health.state))
            .collect();

        HealthReport {
            status: overall_status(dependencies.values().copied()),
            dependencies,
        }
    }

    /// Full breaker snapshots plus service information
    pub fn detailed_health(&self) -> DetailedHealthReport {
        let dependencies: BTreeMap<String, DependencyHealth> = self
            .tracker
            .report_all()
            .into_iter()
            .map(|(name, health)| (name.to_string(), health))
            .collect();

        DetailedHealthReport {
            status: overall_status(dependencies.values().map(|health| health.state)),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: self.environment.clone(),
            uptime_seconds: self.uptime_seconds(),
            timestamp: Utc::now(),
            dependencies,
        }
    }
}

fn overall_status(mut states: impl Iterator<Item = CircuitState>) -> OverallStatus {
    if states.all(|state| state == CircuitState::Closed) {
        OverallStatus::Healthy
    } else {
        OverallStatus::Degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::Dependency;

    #[test]
    fn test_all_closed_is_healthy() {
        let service = HealthService::new(DependencyHealthTracker::default(), "test");
        let report = service.health();

        assert_eq!(report.status, OverallStatus::Healthy);
        assert_eq!(report.dependencies["repository"], CircuitState::Closed);
        assert_eq!(report.dependencies["event_sender"], CircuitState::Closed);

        let body = serde_json::to_value(&report).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["dependencies"]["event_sender"], "CLOSED");
    }

    #[test]
    fn test_any_open_breaker_degrades() {
        let tracker = DependencyHealthTracker::default();
        tracker.breaker(Dependency::Repository).force_open();
        let service = HealthService::new(tracker, "test");

        let report = service.health();
        assert_eq!(report.status, OverallStatus::Degraded);
        assert_eq!(report.dependencies["repository"], CircuitState::Open);

        let detailed = service.detailed_health();
        assert_eq!(detailed.status, OverallStatus::Degraded);
        assert!(detailed.dependencies["repository"].opened_at.is_some());
        assert_eq!(detailed.environment, "test");
    }

    #[test]
    fn test_reading_health_does_not_touch_breakers() {
        let tracker = DependencyHealthTracker::default();
        let service = HealthService::new(tracker.clone(), "test");

        for _ in 0..10 {
            service.health();
            service.detailed_health();
        }

        let repository = tracker.report(Dependency::Repository);
        assert_eq!(repository.metrics.total_calls, 0);
        assert_eq!(repository.metrics.rejected_calls, 0);
    }
}
