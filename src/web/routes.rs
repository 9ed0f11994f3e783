//! REST route table.

use axum::{
    routing::{get, put},
    Router,
};

use crate::web::{handlers, state::AppState};

/// Task lifecycle routes
pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tasks",
            get(handlers::tasks::list_tasks).post(handlers::tasks::create_task),
        )
        .route(
            "/tasks/{id}",
            get(handlers::tasks::get_task).delete(handlers::tasks::delete_task),
        )
        .route("/tasks/{id}/complete", put(handlers::tasks::complete_task))
}

/// Dependency health routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/detailed", get(handlers::health::detailed_health_check))
}
