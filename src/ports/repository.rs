//! Repository port: the persistence contract for tasks.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Task, TaskId, TaskStatus};

/// Failures of the backing store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The store could not be reached
    #[error("Repository unavailable: {0}")]
    Unavailable(String),

    /// The store rejected or failed the operation
    #[error("Storage failure: {0}")]
    Storage(String),
}

/// Persistence contract for tasks.
///
/// Implementations are the single source of truth for task state and must
/// serialize conflicting writes to the same id.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert or replace a task
    async fn save(&self, task: &Task) -> Result<(), RepositoryError>;

    /// Replace a task only if the stored record still has status `expected`.
    ///
    /// Returns `false` when the record is gone or its status moved on, so a
    /// concurrent delete is never undone and a concurrent transition is never
    /// overwritten.
    async fn update(&self, task: &Task, expected: TaskStatus) -> Result<bool, RepositoryError>;

    /// Look up a task. Tombstoned tasks may be returned with `TaskStatus::Deleted`.
    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>, RepositoryError>;

    /// Live tasks in creation order, skipping `offset` and returning at most `limit`
    async fn find_all(&self, offset: usize, limit: usize) -> Result<Vec<Task>, RepositoryError>;

    /// Delete a task, by removal or tombstone.
    ///
    /// Returns `false` when no live task with the id exists.
    async fn delete(&self, id: &TaskId) -> Result<bool, RepositoryError>;
}
