//! # Task Model
//!
//! The task entity, its identifier, and its lifecycle status.
//!
//! A task moves `Pending -> Completed` and `{Pending, Completed} -> Deleted`,
//! never backward. The `completed` flag exposed by the adapters is always derived
//! from [`TaskStatus`]; it is never stored alongside it.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{TaskError, TaskResult};

/// Unique task identifier, generated by the service at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl From<Uuid> for TaskId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Initial state when the task is created
    Pending,
    /// Task was marked complete
    Completed,
    /// Task was deleted (only observable in repositories that keep tombstones)
    Deleted,
}

impl TaskStatus {
    /// Whether `self -> next` is a legal lifecycle transition
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Completed)
                | (Self::Pending, Self::Deleted)
                | (Self::Completed, Self::Deleted)
        )
    }

    pub fn is_live(&self) -> bool {
        !matches!(self, Self::Deleted)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "deleted" => Ok(Self::Deleted),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

/// The central task entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub configuration_id: String,
    pub location_id: String,
    pub user_id: Option<String>,
    pub role_id: Option<String>,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Build a new pending task from a validated creation command
    pub fn new(command: ValidatedCreateTask, now: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new(),
            configuration_id: command.configuration_id,
            location_id: command.location_id,
            user_id: command.user_id,
            role_id: command.role_id,
            due_date: command.due_date,
            status: TaskStatus::Pending,
            created_at: now,
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Mark the task completed.
    ///
    /// Returns `Ok(true)` when the status changed and `Ok(false)` when the task
    /// was already completed. Deleted tasks cannot be completed.
    pub fn complete(&mut self, now: DateTime<Utc>) -> TaskResult<bool> {
        match self.status {
            TaskStatus::Completed => Ok(false),
            TaskStatus::Deleted => Err(TaskError::invalid_state(
                self.id.to_string(),
                "deleted tasks cannot be completed",
            )),
            TaskStatus::Pending => {
                self.status = TaskStatus::Completed;
                self.completed_at = Some(now);
                Ok(true)
            }
        }
    }

    /// Mark the task as a tombstone
    pub fn mark_deleted(&mut self) -> TaskResult<()> {
        if !self.status.can_transition_to(TaskStatus::Deleted) {
            return Err(TaskError::invalid_state(
                self.id.to_string(),
                format!("cannot delete a task in status {}", self.status),
            ));
        }
        self.status = TaskStatus::Deleted;
        Ok(())
    }
}

/// Creation input as received from an adapter, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTaskCommand {
    pub configuration_id: String,
    pub location_id: String,
    pub user_id: Option<String>,
    pub role_id: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Creation input that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCreateTask {
    configuration_id: String,
    location_id: String,
    user_id: Option<String>,
    role_id: Option<String>,
    due_date: DateTime<Utc>,
}

impl CreateTaskCommand {
    /// Check required fields and normalize optional ones.
    ///
    /// Blank optional references are treated as absent.
    pub fn validate(self) -> TaskResult<ValidatedCreateTask> {
        let configuration_id = self.configuration_id.trim().to_string();
        if configuration_id.is_empty() {
            return Err(TaskError::validation("configuration_id is required"));
        }

        let location_id = self.location_id.trim().to_string();
        if location_id.is_empty() {
            return Err(TaskError::validation("location_id is required"));
        }

        let due_date = self
            .due_date
            .ok_or_else(|| TaskError::validation("due_date is required"))?;

        Ok(ValidatedCreateTask {
            configuration_id,
            location_id,
            user_id: non_blank(self.user_id),
            role_id: non_blank(self.role_id),
            due_date,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an ISO-8601 due date as sent by REST clients.
///
/// Accepts RFC 3339 timestamps with an offset, and naive date-times which are
/// interpreted as UTC.
pub fn parse_iso8601_due_date(raw: &str) -> TaskResult<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TaskError::validation("due_date is required"));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| {
            TaskError::validation(format!("due_date '{raw}' is not a valid ISO-8601 timestamp"))
        })
}

/// Convert epoch seconds as sent by gRPC clients
pub fn due_date_from_epoch_seconds(seconds: i64) -> TaskResult<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
        TaskError::validation(format!("due_date {seconds} is out of the supported range"))
    })
}
