//! Type conversions between Protocol Buffer types and domain types.
//!
//! Timestamps cross the wire as whole seconds since the Unix epoch.

use tonic::{Code, Status};

use crate::error::{TaskError, TaskResult};
use crate::grpc::proto;
use crate::models::{due_date_from_epoch_seconds, CreateTaskCommand, Task};

impl From<Task> for proto::Task {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.to_string(),
            completed: task.is_completed(),
            configuration_id: task.configuration_id,
            location_id: task.location_id,
            user_id: task.user_id,
            role_id: task.role_id,
            due_date: task.due_date.timestamp(),
            created_at: task.created_at.timestamp(),
            completed_at: task.completed_at.map(|at| at.timestamp()),
        }
    }
}

impl TryFrom<proto::CreateTaskRequest> for CreateTaskCommand {
    type Error = TaskError;

    fn try_from(request: proto::CreateTaskRequest) -> TaskResult<Self> {
        let due_date = request.due_date.map(due_date_from_epoch_seconds).transpose()?;

        Ok(Self {
            configuration_id: request.configuration_id,
            location_id: request.location_id,
            user_id: request.user_id,
            role_id: request.role_id,
            due_date,
        })
    }
}

/// Map a domain error onto a gRPC status code
pub fn task_error_to_status(err: TaskError) -> Status {
    let code = match &err {
        TaskError::Validation(_) => Code::InvalidArgument,
        TaskError::NotFound { .. } => Code::NotFound,
        TaskError::InvalidState { .. } => Code::FailedPrecondition,
        TaskError::DependencyUnavailable { .. } => Code::Unavailable,
        TaskError::Persistence(_) | TaskError::Publication(_) => Code::Internal,
    };
    Status::new(code, err.to_string())
}
