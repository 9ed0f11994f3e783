//! Task domain event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

use crate::models::{Task, TaskId};

/// The kinds of event the domain service publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskEventType {
    TaskCreated,
    TaskCompleted,
    TaskDeleted,
}

impl TaskEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskCreated => "TaskCreated",
            Self::TaskCompleted => "TaskCompleted",
            Self::TaskDeleted => "TaskDeleted",
        }
    }
}

impl fmt::Display for TaskEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A domain event about one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEvent {
    pub event_type: TaskEventType,
    pub task_id: TaskId,
    pub payload: Value,
    pub occurred_at: DateTime<Utc>,
}

impl TaskEvent {
    /// Creation events carry the full task as submitted
    pub fn created(task: &Task) -> Self {
        Self {
            event_type: TaskEventType::TaskCreated,
            task_id: task.id,
            payload: json!({
                "task_id": task.id,
                "configuration_id": task.configuration_id,
                "location_id": task.location_id,
                "user_id": task.user_id,
                "role_id": task.role_id,
                "due_date": task.due_date,
                "status": task.status,
            }),
            occurred_at: Utc::now(),
        }
    }

    pub fn completed(task_id: TaskId) -> Self {
        Self::id_only(TaskEventType::TaskCompleted, task_id)
    }

    pub fn deleted(task_id: TaskId) -> Self {
        Self::id_only(TaskEventType::TaskDeleted, task_id)
    }

    fn id_only(event_type: TaskEventType, task_id: TaskId) -> Self {
        Self {
            event_type,
            task_id,
            payload: json!({ "task_id": task_id }),
            occurred_at: Utc::now(),
        }
    }
}
