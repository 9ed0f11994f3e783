//! # Task Service Errors
//!
//! Domain-level error taxonomy shared by the REST and gRPC adapters. Each
//! adapter maps these variants onto its own status codes; the variants
//! themselves never carry protocol details.

use thiserror::Error;

use crate::ports::{EventSenderError, RepositoryError};
use crate::resilience::CircuitBreakerError;

/// Errors surfaced by task lifecycle operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// Missing or malformed required field
    #[error("Validation error: {0}")]
    Validation(String),

    /// No live task with the given id
    #[error("Task not found: {task_id}")]
    NotFound { task_id: String },

    /// Operation is illegal for the task's current status
    #[error("Invalid state for task {task_id}: {reason}")]
    InvalidState { task_id: String, reason: String },

    /// The dependency's circuit breaker is open
    #[error("Dependency unavailable: {dependency}")]
    DependencyUnavailable { dependency: String },

    /// Underlying store failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Event sender failure
    #[error("Publication error: {0}")]
    Publication(String),
}

impl TaskError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(task_id: impl Into<String>) -> Self {
        Self::NotFound {
            task_id: task_id.into(),
        }
    }

    pub fn invalid_state(task_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidState {
            task_id: task_id.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code, used in REST error bodies and logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::DependencyUnavailable { .. } => "DEPENDENCY_UNAVAILABLE",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::Publication(_) => "PUBLICATION_ERROR",
        }
    }
}

impl From<CircuitBreakerError<RepositoryError>> for TaskError {
    fn from(err: CircuitBreakerError<RepositoryError>) -> Self {
        match err {
            CircuitBreakerError::CircuitOpen { component } => Self::DependencyUnavailable {
                dependency: component,
            },
            CircuitBreakerError::OperationFailed(inner) => Self::Persistence(inner.to_string()),
        }
    }
}

impl From<CircuitBreakerError<EventSenderError>> for TaskError {
    fn from(err: CircuitBreakerError<EventSenderError>) -> Self {
        match err {
            CircuitBreakerError::CircuitOpen { component } => Self::DependencyUnavailable {
                dependency: component,
            },
            CircuitBreakerError::OperationFailed(inner) => Self::Publication(inner.to_string()),
        }
    }
}

pub type TaskResult<T> = std::result::Result<T, TaskError>;
