//! # Circuit Breaker Protected Ports
//!
//! Wrap the repository and event sender ports so every call goes through the
//! dependency's breaker. Open breakers reject calls without touching the port.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::events::TaskEvent;
use crate::models::{Task, TaskId, TaskStatus};
use crate::ports::{EventSender, EventSenderError, RepositoryError, TaskRepository};
use crate::resilience::{CircuitBreaker, CircuitBreakerError, Dependency, DependencyHealthTracker};

type RepositoryResult<T> = Result<T, CircuitBreakerError<RepositoryError>>;

/// Task repository with circuit breaker protection
#[derive(Clone)]
pub struct ProtectedTaskRepository {
    repository: Arc<dyn TaskRepository>,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl std::fmt::Debug for ProtectedTaskRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtectedTaskRepository")
            .field("circuit_breaker", &self.circuit_breaker.name())
            .finish_non_exhaustive()
    }
}

impl ProtectedTaskRepository {
    pub fn new(repository: Arc<dyn TaskRepository>, tracker: &DependencyHealthTracker) -> Self {
        Self {
            repository,
            circuit_breaker: tracker.breaker(Dependency::Repository),
        }
    }

    pub async fn save(&self, task: &Task) -> RepositoryResult<()> {
        self.circuit_breaker
            .call(|| async { self.repository.save(task).await })
            .await
    }

    pub async fn update(&self, task: &Task, expected: TaskStatus) -> RepositoryResult<bool> {
        self.circuit_breaker
            .call(|| async { self.repository.update(task, expected).await })
            .await
    }

    pub async fn find_by_id(&self, id: &TaskId) -> RepositoryResult<Option<Task>> {
        self.circuit_breaker
            .call(|| async { self.repository.find_by_id(id).await })
            .await
    }

    pub async fn find_all(&self, offset: usize, limit: usize) -> RepositoryResult<Vec<Task>> {
        self.circuit_breaker
            .call(|| async { self.repository.find_all(offset, limit).await })
            .await
    }

    pub async fn delete(&self, id: &TaskId) -> RepositoryResult<bool> {
        self.circuit_breaker
            .call(|| async { self.repository.delete(id).await })
            .await
    }
}

/// Event sender with circuit breaker protection and a bounded publish time
#[derive(Clone)]
pub struct ProtectedEventSender {
    sender: Arc<dyn EventSender>,
    circuit_breaker: Arc<CircuitBreaker>,
    publish_timeout: Duration,
}

impl std::fmt::Debug for ProtectedEventSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtectedEventSender")
            .field("circuit_breaker", &self.circuit_breaker.name())
            .field("publish_timeout", &self.publish_timeout)
            .finish_non_exhaustive()
    }
}

impl ProtectedEventSender {
    pub fn new(
        sender: Arc<dyn EventSender>,
        tracker: &DependencyHealthTracker,
        publish_timeout: Duration,
    ) -> Self {
        Self {
            sender,
            circuit_breaker: tracker.breaker(Dependency::EventSender),
            publish_timeout,
        }
    }

    /// Publish an event; a publish that outlives the timeout counts as a failure
    pub async fn publish(&self, event: &TaskEvent) -> Result<(), CircuitBreakerError<EventSenderError>> {
        let timeout = self.publish_timeout;
        self.circuit_breaker
            .call(|| async {
                match tokio::time::timeout(timeout, self.sender.publish(event)).await {
                    Ok(result) => result,
                    Err(_) => {
                        debug!(
                            event_type = %event.event_type,
                            task_id = %event.task_id,
                            timeout_ms = timeout.as_millis() as u64,
                            "Event publish timed out"
                        );
                        Err(EventSenderError::Timeout {
                            timeout_ms: timeout.as_millis() as u64,
                        })
                    }
                }
            })
            .await
    }
}
