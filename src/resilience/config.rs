//! # Circuit Breaker Configuration
//!
//! Runtime configuration for a single circuit breaker. The serializable,
//! file-backed form lives in [`crate::config::CircuitBreakerSettings`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a single circuit breaker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Number of failures within `failure_window` before opening the circuit
    pub failure_threshold: u32,

    /// Failures older than this no longer count toward the threshold
    pub failure_window: Duration,

    /// Time to wait in open state before allowing a probe
    pub cooldown: Duration,

    /// Number of successful probes in half-open state to close the circuit
    pub success_threshold: u32,
}

impl CircuitBreakerConfig {
    /// Preset for the task repository
    pub fn for_repository() -> Self {
        Self {
            failure_threshold: 5,
            failure_window: Duration::from_secs(60),
            cooldown: Duration::from_secs(30),
            success_threshold: 1,
        }
    }

    /// Preset for the event sender
    pub fn for_event_sender() -> Self {
        Self {
            failure_threshold: 3,
            failure_window: Duration::from_secs(60),
            cooldown: Duration::from_secs(15),
            success_threshold: 1,
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.failure_threshold == 0 {
            return Err("failure_threshold must be greater than 0".to_string());
        }

        if self.failure_threshold > 100 {
            return Err("failure_threshold should not exceed 100".to_string());
        }

        if self.failure_window.is_zero() {
            return Err("failure_window must be greater than 0".to_string());
        }

        if self.cooldown.is_zero() {
            return Err("cooldown must be greater than 0".to_string());
        }

        if self.cooldown > Duration::from_secs(300) {
            return Err("cooldown should not exceed 300 seconds".to_string());
        }

        if self.success_threshold == 0 {
            return Err("success_threshold must be greater than 0".to_string());
        }

        if self.success_threshold > 50 {
            return Err("success_threshold should not exceed 50".to_string());
        }

        Ok(())
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self::for_repository()
    }
}
