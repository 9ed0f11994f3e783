//! # Resilience Module
//!
//! Circuit breakers that isolate the task service from failing dependencies.
//!
//! ## Architecture
//!
//! - **Circuit Breakers**: one per dependency, failing fast while a dependency is down
//! - **Dependency Health Tracker**: owns the breakers and serves read-only snapshots
//! - **Protected Ports**: repository and event sender wrappers that call through the breakers
//!
//! ## Usage
//!
//! ```rust,no_run
//! use task_service::resilience::{CircuitBreaker, CircuitBreakerConfig};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CircuitBreakerConfig {
//!     failure_threshold: 5,
//!     failure_window: Duration::from_secs(60),
//!     cooldown: Duration::from_secs(30),
//!     success_threshold: 1,
//! };
//!
//! let circuit_breaker = CircuitBreaker::new("repository", config);
//!
//! let result = circuit_breaker.call(|| async {
//!     Ok::<&str, std::io::Error>("success")
//! }).await?;
//! # Ok(())
//! # }
//! ```

pub mod circuit_breaker;
pub mod config;
pub mod metrics;
pub mod protected;
pub mod tracker;

pub use circuit_breaker::{CallPermit, CircuitBreaker, CircuitBreakerError, CircuitState, DependencyHealth};
pub use config::CircuitBreakerConfig;
pub use metrics::CircuitBreakerMetrics;
pub use protected::{ProtectedEventSender, ProtectedTaskRepository};
pub use tracker::{Dependency, DependencyHealthTracker};
