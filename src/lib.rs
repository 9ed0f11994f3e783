#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Task Service
//!
//! Task lifecycle management served over REST and gRPC at the same time.
//!
//! ## Overview
//!
//! Tasks are created, read, listed, completed and deleted through a single
//! domain service. The service depends on two ports, a task repository and an
//! event sender, and reaches both through per-dependency circuit breakers. The
//! breaker states (`CLOSED`, `OPEN`, `HALF_OPEN`) are what `GET /health`
//! reports.
//!
//! ## Module Organization
//!
//! - [`models`] - Task entity, identifiers and pagination
//! - [`ports`] - Repository and event sender contracts
//! - [`persistence`] - In-memory repository
//! - [`events`] - Task events and in-process event senders
//! - [`resilience`] - Circuit breakers and the dependency health tracker
//! - [`services`] - Task domain service and health service
//! - [`web`] - REST API (axum)
//! - [`grpc`] - gRPC API (tonic)
//! - [`bootstrap`] - Wiring and server lifecycle
//! - [`config`] - Layered configuration
//! - [`logging`] - Structured logging setup
//! - [`error`] - Domain error taxonomy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use task_service::bootstrap::ServiceBootstrap;
//! use task_service::config::ConfigManager;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config_manager = ConfigManager::load()?;
//! task_service::logging::init_structured_logging(&config_manager.config().logging);
//!
//! ServiceBootstrap::new(config_manager)
//!     .run_until(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit and integration tests
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod events;
pub mod grpc;
pub mod logging;
pub mod models;
pub mod persistence;
pub mod ports;
pub mod resilience;
pub mod services;
pub mod web;

pub use config::{ConfigManager, ServiceConfig};
pub use error::{TaskError, TaskResult};
pub use models::{CreateTaskCommand, Task, TaskId, TaskStatus};
pub use services::{HealthService, TaskOperations, TaskService};
