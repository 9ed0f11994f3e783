//! # Services
//!
//! The task domain service and the health service built over the dependency
//! tracker. Both are protocol-agnostic; the REST and gRPC adapters call them.

pub mod health_service;
pub mod task_service;

pub use health_service::{DetailedHealthReport, HealthReport, HealthService, OverallStatus};
pub use task_service::{TaskOperations, TaskService};
