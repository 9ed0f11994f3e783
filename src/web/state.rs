//! # Web API Application State
//!
//! Shared state handed to every axum handler.

use std::sync::Arc;

use crate::services::{HealthService, TaskOperations};

#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<dyn TaskOperations>,
    pub health: Arc<HealthService>,
}

impl AppState {
    pub fn new(tasks: Arc<dyn TaskOperations>, health: Arc<HealthService>) -> Self {
        Self { tasks, health }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tasks", &"<dyn TaskOperations>")
            .field("health", &self.health)
            .finish()
    }
}
