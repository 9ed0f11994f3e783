//! # Dependency Health Tracker
//!
//! Owns one circuit breaker per tracked dependency. The domain service calls
//! through the breakers (via the protected port wrappers); the health service
//! only reads snapshots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::circuit_breaker::{CircuitBreaker, CircuitState, DependencyHealth};
use super::CircuitBreakerConfig;
use crate::config::CircuitBreakersConfig;

/// The outbound dependencies whose health is tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dependency {
    Repository,
    EventSender,
}

impl Dependency {
    pub const ALL: [Dependency; 2] = [Dependency::Repository, Dependency::EventSender];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dependency::Repository => "repository",
            Dependency::EventSender => "event_sender",
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct DependencyHealthTracker {
    repository: Arc<CircuitBreaker>,
    event_sender: Arc<CircuitBreaker>,
}

impl DependencyHealthTracker {
    pub fn new(repository: CircuitBreakerConfig, event_sender: CircuitBreakerConfig) -> Self {
        Self {
            repository: Arc::new(CircuitBreaker::new(Dependency::Repository.as_str(), repository)),
            event_sender: Arc::new(CircuitBreaker::new(
                Dependency::EventSender.as_str(),
                event_sender,
            )),
        }
    }

    pub fn from_config(config: &CircuitBreakersConfig) -> Self {
        Self::new(
            config.repository.to_breaker_config(),
            config.event_sender.to_breaker_config(),
        )
    }

    pub fn breaker(&self, dependency: Dependency) -> Arc<CircuitBreaker> {
        match dependency {
            Dependency::Repository => Arc::clone(&self.repository),
            Dependency::EventSender => Arc::clone(&self.event_sender),
        }
    }

    pub fn state(&self, dependency: Dependency) -> CircuitState {
        self.breaker(dependency).state()
    }

    /// Read-only snapshot of one dependency
    pub fn report(&self, dependency: Dependency) -> DependencyHealth {
        self.breaker(dependency).snapshot()
    }

    /// Read-only snapshots of every dependency, keyed by name
    pub fn report_all(&self) -> BTreeMap<&'static str, DependencyHealth> {
        Dependency::ALL
            .iter()
            .map(|dependency| (dependency.as_str(), self.report(*dependency)))
            .collect()
    }

    pub fn all_closed(&self) -> bool {
        Dependency::ALL
            .iter()
            .all(|dependency| self.state(*dependency) == CircuitState::Closed)
    }
}

impl Default for DependencyHealthTracker {
    fn default() -> Self {
        Self::new(
            CircuitBreakerConfig::for_repository(),
            CircuitBreakerConfig::for_event_sender(),
        )
    }
}
