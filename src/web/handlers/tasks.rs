//! # Task Handlers
//!
//! HTTP handlers for the task lifecycle. Each handler is a thin translation to
//! one [`TaskOperations`](crate::services::TaskOperations) call.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;

use crate::web::errors::ApiResult;
use crate::web::response_types::{CreateTaskRequest, ListTasksQuery, TaskResponse};
use crate::web::state::AppState;

/// Create a task: POST /tasks
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let Json(request) = payload?;
    let command = request.into_command()?;

    let task = state.tasks.create_task(command).await?;
    debug!(task_id = %task.id, "Task created via REST");

    Ok((StatusCode::CREATED, Json(task.into())))
}

/// Fetch a task: GET /tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state.tasks.get_task(&task_id).await?;
    Ok(Json(task.into()))
}

/// List tasks: GET /tasks?page=&limit=
pub async fn list_tasks(
    State(state): State<AppState>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let Query(query) = query?;
    let tasks = state.tasks.list_tasks(query.page, query.limit).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// Complete a task: PUT /tasks/{id}/complete
pub async fn complete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state.tasks.complete_task(&task_id).await?;
    Ok(Json(task.into()))
}

/// Delete a task: DELETE /tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.tasks.delete_task(&task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
