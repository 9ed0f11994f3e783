//! # REST Request and Response Types
//!
//! Wire shapes for the task endpoints. Dates are RFC 3339 on the way out and
//! ISO-8601 (RFC 3339, or a naive date-time read as UTC) on the way in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TaskResult;
use crate::models::{parse_iso8601_due_date, CreateTaskCommand, Task, TaskStatus};

/// `POST /tasks` body.
///
/// Every field is optional at the JSON level so a missing required field is
/// reported as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub configuration_id: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

impl CreateTaskRequest {
    pub fn into_command(self) -> TaskResult<CreateTaskCommand> {
        let due_date = self
            .due_date
            .as_deref()
            .map(parse_iso8601_due_date)
            .transpose()?;

        Ok(CreateTaskCommand {
            configuration_id: self.configuration_id.unwrap_or_default(),
            location_id: self.location_id.unwrap_or_default(),
            user_id: self.user_id,
            role_id: self.role_id,
            due_date,
        })
    }
}

/// `GET /tasks` query string
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListTasksQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: String,
    pub configuration_id: String,
    pub location_id: String,
    pub user_id: Option<String>,
    pub role_id: Option<String>,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.to_string(),
            completed: task.is_completed(),
            configuration_id: task.configuration_id,
            location_id: task.location_id,
            user_id: task.user_id,
            role_id: task.role_id,
            due_date: task.due_date,
            status: task.status,
            created_at: task.created_at,
            completed_at: task.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;

    #[test]
    fn test_request_parses_naive_due_date_as_utc() {
        let request: CreateTaskRequest = serde_json::from_str(
            r#"{"configuration_id":"c","location_id":"l","due_date":"2030-01-02T03:04:05"}"#,
        )
        .unwrap();

        let command = request.into_command().unwrap();
        assert_eq!(
            command.due_date.unwrap().to_rfc3339(),
            "2030-01-02T03:04:05+00:00"
        );
    }

    #[test]
    fn test_malformed_due_date_is_validation_error() {
        let request = CreateTaskRequest {
            due_date: Some("next tuesday".to_string()),
            ..Default::default()
        };
        assert!(matches!(request.into_command(), Err(TaskError::Validation(_))));
    }
}
