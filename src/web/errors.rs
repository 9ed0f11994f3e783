//! # Web API Error Types
//!
//! HTTP mapping of domain errors. Every error response carries the body
//! `{"error": {"code": ..., "message": ...}}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::error::TaskError;

/// Web API errors with HTTP status code mappings
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("JSON body could not be parsed: {message}")]
    JsonError { message: String },

    #[error(transparent)]
    Task(#[from] TaskError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } | ApiError::JsonError { .. } => StatusCode::BAD_REQUEST,
            ApiError::Task(err) => match err {
                TaskError::Validation(_) => StatusCode::BAD_REQUEST,
                TaskError::NotFound { .. } => StatusCode::NOT_FOUND,
                TaskError::InvalidState { .. } => StatusCode::CONFLICT,
                TaskError::DependencyUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                TaskError::Persistence(_) | TaskError::Publication(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::JsonError { .. } => "JSON_ERROR",
            ApiError::Task(err) => err.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            error!(status = status_code.as_u16(), error = %self, "Request failed");
        } else {
            debug!(status = status_code.as_u16(), error = %self, "Request rejected");
        }

        let error_response = json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string()
            }
        });

        (status_code, Json(error_response)).into_response()
    }
}

/// Malformed or mistyped JSON bodies are client errors (400), never 422
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::JsonError {
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// Result type alias for web API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_status_codes() {
        let cases = [
            (TaskError::validation("x"), StatusCode::BAD_REQUEST),
            (TaskError::not_found("x"), StatusCode::NOT_FOUND),
            (TaskError::invalid_state("x", "deleted"), StatusCode::CONFLICT),
            (
                TaskError::DependencyUnavailable {
                    dependency: "repository".to_string(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (TaskError::Persistence("x".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
            (TaskError::Publication("x".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status_code(), expected);
        }
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::from(TaskError::not_found("abc")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "Task not found: abc");
    }
}
