//! # Task Service Configuration
//!
//! Typed configuration for the task service, loaded by [`ConfigManager`] from
//! layered sources: built-in defaults, `config/task-service.toml`, an optional
//! environment-specific override file, and `TASK_SERVICE_*` environment
//! variables.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use task_service::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let rest_address = &manager.config().rest.bind_address;
//! let threshold = manager.config().circuit_breakers.repository.failure_threshold;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::resilience::CircuitBreakerConfig;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring `config/task-service.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub rest: RestConfig,
    pub grpc: GrpcConfig,
    pub repository: RepositoryConfig,
    pub event_sender: EventSenderConfig,
    pub circuit_breakers: CircuitBreakersConfig,
    pub pagination: PaginationConfig,
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Validate cross-field constraints after all sources are merged
    pub fn validate(&self) -> ConfigResult<()> {
        self.rest.validate()?;
        self.grpc.validate()?;
        self.event_sender.validate()?;
        self.pagination.validate()?;

        for (name, breaker) in [
            ("circuit_breakers.repository", &self.circuit_breakers.repository),
            ("circuit_breakers.event_sender", &self.circuit_breakers.event_sender),
        ] {
            breaker
                .to_breaker_config()
                .validate()
                .map_err(|reason| ConfigurationError::invalid_value(name, format!("{breaker:?}"), reason))?;
        }

        Ok(())
    }
}

/// REST server settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RestConfig {
    pub bind_address: String,
    pub request_timeout_ms: u64,
}

impl RestConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    fn validate(&self) -> ConfigResult<()> {
        validate_socket_address("rest.bind_address", &self.bind_address)?;
        if self.request_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "rest.request_timeout_ms",
                "0",
                "request timeout must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

/// gRPC server settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GrpcConfig {
    pub enabled: bool,
    pub bind_address: String,
    pub request_timeout_ms: u64,
    pub enable_reflection: bool,
    pub enable_health_service: bool,
}

impl GrpcConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    fn validate(&self) -> ConfigResult<()> {
        if !self.enabled {
            return Ok(());
        }
        validate_socket_address("grpc.bind_address", &self.bind_address)?;
        if self.request_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "grpc.request_timeout_ms",
                "0",
                "request timeout must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Default for GrpcConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:50051".to_string(),
            request_timeout_ms: 30_000,
            enable_reflection: true,
            enable_health_service: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryBackend {
    #[default]
    Memory,
}

/// What happens to a task record on delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TombstonePolicy {
    /// Remove the record
    #[default]
    Purge,
    /// Keep the record with status `deleted`, hidden from reads
    Retain,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RepositoryConfig {
    pub backend: RepositoryBackend,
    pub tombstone_policy: TombstonePolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSenderBackend {
    /// Write events to the structured log
    #[default]
    Logging,
    /// Fan events out to in-process subscribers
    Broadcast,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EventSenderConfig {
    pub backend: EventSenderBackend,
    pub channel_capacity: usize,
    /// Upper bound on how long a mutation waits for its event to publish
    pub publish_timeout_ms: u64,
}

impl EventSenderConfig {
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.channel_capacity == 0 {
            return Err(ConfigurationError::invalid_value(
                "event_sender.channel_capacity",
                "0",
                "channel capacity must be greater than 0",
            ));
        }
        if self.publish_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "event_sender.publish_timeout_ms",
                "0",
                "publish timeout must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Default for EventSenderConfig {
    fn default() -> Self {
        Self {
            backend: EventSenderBackend::Logging,
            channel_capacity: 1000,
            publish_timeout_ms: 500,
        }
    }
}

/// Circuit breaker settings for both tracked dependencies
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakersConfig {
    pub repository: CircuitBreakerSettings,
    pub event_sender: CircuitBreakerSettings,
}

impl Default for CircuitBreakersConfig {
    fn default() -> Self {
        Self {
            repository: CircuitBreakerSettings {
                failure_threshold: 5,
                failure_window_seconds: 60,
                cooldown_seconds: 30,
                success_threshold: 1,
            },
            event_sender: CircuitBreakerSettings {
                failure_threshold: 3,
                failure_window_seconds: 60,
                cooldown_seconds: 15,
                success_threshold: 1,
            },
        }
    }
}

/// Serializable breaker settings, in whole seconds
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerSettings {
    pub failure_threshold: u32,
    pub failure_window_seconds: u64,
    pub cooldown_seconds: u64,
    pub success_threshold: u32,
}

impl CircuitBreakerSettings {
    pub fn to_breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            failure_window: Duration::from_secs(self.failure_window_seconds),
            cooldown: Duration::from_secs(self.cooldown_seconds),
            success_threshold: self.success_threshold,
        }
    }
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            failure_window_seconds: 60,
            cooldown_seconds: 30,
            success_threshold: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl PaginationConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.default_limit == 0 || self.max_limit == 0 {
            return Err(ConfigurationError::invalid_value(
                "pagination",
                format!("{self:?}"),
                "page sizes must be greater than 0",
            ));
        }
        if self.default_limit > self.max_limit {
            return Err(ConfigurationError::invalid_value(
                "pagination.default_limit",
                self.default_limit.to_string(),
                "default_limit must not exceed max_limit",
            ));
        }
        Ok(())
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

fn validate_socket_address(field: &str, value: &str) -> ConfigResult<()> {
    value
        .parse::<std::net::SocketAddr>()
        .map(|_| ())
        .map_err(|e| ConfigurationError::invalid_value(field, value, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rest.bind_address, "0.0.0.0:8000");
        assert_eq!(config.grpc.bind_address, "0.0.0.0:50051");
        assert_eq!(config.pagination.default_limit, 10);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = ServiceConfig::default();
        config.rest.bind_address = "not-an-address".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidValue { field, .. }) if field == "rest.bind_address"
        ));

        let mut config = ServiceConfig::default();
        config.circuit_breakers.repository.failure_threshold = 0;
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::default();
        config.pagination.default_limit = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_disabled_grpc_skips_address_validation() {
        let mut config = ServiceConfig::default();
        config.grpc.enabled = false;
        config.grpc.bind_address = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_breaker_settings_convert_to_durations() {
        let settings = CircuitBreakerSettings {
            failure_threshold: 2,
            failure_window_seconds: 10,
            cooldown_seconds: 5,
            success_threshold: 1,
        };
        let breaker = settings.to_breaker_config();
        assert_eq!(breaker.failure_threshold, 2);
        assert_eq!(breaker.failure_window, Duration::from_secs(10));
        assert_eq!(breaker.cooldown, Duration::from_secs(5));
    }
}
