//! # REST API
//!
//! axum application exposing the task lifecycle and the dependency health
//! endpoint. Handlers translate HTTP to [`TaskOperations`](crate::services::TaskOperations)
//! calls and domain errors to status codes.

use axum::http::StatusCode;
use axum::Router;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

pub mod errors;
pub mod handlers;
pub mod response_types;
pub mod routes;
pub mod state;

pub use errors::{ApiError, ApiResult};
pub use state::AppState;

/// Create the web application with all routes and middleware
pub fn create_app(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let common_middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(cors);

    let app = Router::new()
        .merge(routes::task_routes())
        .merge(routes::health_routes())
        .layer(common_middleware)
        .with_state(state);

    info!(
        request_timeout_ms = request_timeout.as_millis() as u64,
        "Web application created with all routes and middleware"
    );
    app
}
