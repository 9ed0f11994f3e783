//! In-memory task repository.
//!
//! Records live in a `DashMap`, so writes to the same id are serialized by the
//! map's shard locks. A monotonically increasing sequence number, assigned on
//! first save, preserves creation order for listings.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::config::TombstonePolicy;
use crate::models::{Task, TaskId, TaskStatus};
use crate::ports::{RepositoryError, TaskRepository};

#[derive(Debug, Clone)]
struct StoredTask {
    sequence: u64,
    task: Task,
}

#[derive(Debug)]
pub struct InMemoryTaskRepository {
    tasks: DashMap<TaskId, StoredTask>,
    next_sequence: AtomicU64,
    tombstone_policy: TombstonePolicy,
}

impl InMemoryTaskRepository {
    pub fn new(tombstone_policy: TombstonePolicy) -> Self {
        Self {
            tasks: DashMap::new(),
            next_sequence: AtomicU64::new(0),
            tombstone_policy,
        }
    }

    /// Number of stored records, tombstones included
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new(TombstonePolicy::Purge)
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn save(&self, task: &Task) -> Result<(), RepositoryError> {
        match self.tasks.entry(task.id) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().task = task.clone();
            }
            Entry::Vacant(vacant) => {
                let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
                vacant.insert(StoredTask {
                    sequence,
                    task: task.clone(),
                });
            }
        }
        debug!(task_id = %task.id, status = %task.status, "Task saved");
        Ok(())
    }

    async fn update(&self, task: &Task, expected: TaskStatus) -> Result<bool, RepositoryError> {
        match self.tasks.get_mut(&task.id) {
            Some(mut stored) if stored.task.status == expected => {
                stored.task = task.clone();
                Ok(true)
            }
            Some(stored) => {
                debug!(
                    task_id = %task.id,
                    expected = %expected,
                    actual = %stored.task.status,
                    "Conditional update rejected"
                );
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>, RepositoryError> {
        Ok(self.tasks.get(id).map(|stored| stored.task.clone()))
    }

    async fn find_all(&self, offset: usize, limit: usize) -> Result<Vec<Task>, RepositoryError> {
        let mut live: Vec<(u64, Task)> = self
            .tasks
            .iter()
            .filter(|entry| entry.task.status.is_live())
            .map(|entry| (entry.sequence, entry.task.clone()))
            .collect();
        live.sort_unstable_by_key(|(sequence, _)| *sequence);

        Ok(live
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, task)| task)
            .collect())
    }

    async fn delete(&self, id: &TaskId) -> Result<bool, RepositoryError> {
        let deleted = match self.tombstone_policy {
            TombstonePolicy::Purge => self
                .tasks
                .remove_if(id, |_, stored| stored.task.status.is_live())
                .is_some(),
            TombstonePolicy::Retain => match self.tasks.get_mut(id) {
                Some(mut stored) => stored.task.mark_deleted().is_ok(),
                None => false,
            },
        };
        debug!(task_id = %id, deleted, policy = ?self.tombstone_policy, "Task delete");
        Ok(deleted)
    }
}
