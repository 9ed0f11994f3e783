//! # Health Check Handlers
//!
//! Both endpoints always answer `200`; degradation is reported in the body.

use axum::extract::State;
use axum::Json;

use crate::services::{DetailedHealthReport, HealthReport};
use crate::web::state::AppState;

/// Aggregate dependency health: GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.health.health())
}

/// Breaker snapshots with call metrics: GET /health/detailed
pub async fn detailed_health_check(State(state): State<AppState>) -> Json<DetailedHealthReport> {
    Json(state.health.detailed_health())
}
