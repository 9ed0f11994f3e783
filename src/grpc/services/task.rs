//! Task service gRPC implementation.
//!
//! One RPC per domain operation; request and response shapes are converted in
//! [`crate::grpc::conversions`].

use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::debug;

use crate::grpc::conversions::task_error_to_status;
use crate::grpc::proto::{self, task_service_server::TaskService as TaskServiceTrait};
use crate::models::CreateTaskCommand;
use crate::services::TaskOperations;

#[derive(Clone)]
pub struct TaskGrpcService {
    tasks: Arc<dyn TaskOperations>,
}

impl TaskGrpcService {
    pub fn new(tasks: Arc<dyn TaskOperations>) -> Self {
        Self { tasks }
    }
}

impl std::fmt::Debug for TaskGrpcService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskGrpcService").finish_non_exhaustive()
    }
}

fn non_zero(value: u32) -> Option<u32> {
    (value > 0).then_some(value)
}

#[tonic::async_trait]
impl TaskServiceTrait for TaskGrpcService {
    async fn create_task(
        &self,
        request: Request<proto::CreateTaskRequest>,
    ) -> Result<Response<proto::Task>, Status> {
        let command = CreateTaskCommand::try_from(request.into_inner()).map_err(task_error_to_status)?;

        let task = self
            .tasks
            .create_task(command)
            .await
            .map_err(task_error_to_status)?;
        debug!(task_id = %task.id, "Task created via gRPC");

        Ok(Response::new(task.into()))
    }

    async fn get_task(
        &self,
        request: Request<proto::GetTaskRequest>,
    ) -> Result<Response<proto::Task>, Status> {
        let task_id = request.into_inner().task_id;
        let task = self
            .tasks
            .get_task(&task_id)
            .await
            .map_err(task_error_to_status)?;

        Ok(Response::new(task.into()))
    }

    async fn get_all_tasks(
        &self,
        request: Request<proto::GetAllTasksRequest>,
    ) -> Result<Response<proto::GetAllTasksResponse>, Status> {
        let request = request.into_inner();
        let tasks = self
            .tasks
            .list_tasks(non_zero(request.page), non_zero(request.limit))
            .await
            .map_err(task_error_to_status)?;

        Ok(Response::new(proto::GetAllTasksResponse {
            tasks: tasks.into_iter().map(proto::Task::from).collect(),
        }))
    }

    async fn complete_task(
        &self,
        request: Request<proto::CompleteTaskRequest>,
    ) -> Result<Response<proto::Task>, Status> {
        let task_id = request.into_inner().task_id;
        let task = self
            .tasks
            .complete_task(&task_id)
            .await
            .map_err(task_error_to_status)?;

        Ok(Response::new(task.into()))
    }

    async fn delete_task(
        &self,
        request: Request<proto::DeleteTaskRequest>,
    ) -> Result<Response<proto::Empty>, Status> {
        let task_id = request.into_inner().task_id;
        self.tasks
            .delete_task(&task_id)
            .await
            .map_err(task_error_to_status)?;

        Ok(Response::new(proto::Empty {}))
    }
}
