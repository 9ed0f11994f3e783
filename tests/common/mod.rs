//! Shared helpers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use task_service::bootstrap::ServiceBootstrap;
use task_service::config::{ConfigManager, ServiceConfig};
use task_service::events::TaskEvent;
use task_service::models::{Task, TaskId, TaskStatus};
use task_service::persistence::InMemoryTaskRepository;
use task_service::ports::{EventSender, EventSenderError, RepositoryError, TaskRepository};

/// Configuration bound to loopback with a short breaker cooldown
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.rest.bind_address = "127.0.0.1:0".to_string();
    config.grpc.bind_address = "127.0.0.1:0".to_string();
    config.circuit_breakers.repository.cooldown_seconds = 1;
    config.circuit_breakers.event_sender.cooldown_seconds = 1;
    config
}

pub fn bootstrap_with(
    config: ServiceConfig,
    repository: Arc<dyn TaskRepository>,
    event_sender: Arc<dyn EventSender>,
) -> ServiceBootstrap {
    let manager = ConfigManager::from_config(config, "test").expect("test config is valid");
    ServiceBootstrap::with_ports(manager, repository, event_sender)
}

pub fn default_bootstrap() -> ServiceBootstrap {
    bootstrap_with(
        test_config(),
        Arc::new(InMemoryTaskRepository::default()),
        Arc::new(RecordingSender::default()),
    )
}

/// Send one request through the router and decode the JSON body (Null when empty)
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request builds");

    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body is JSON")
    };
    (status, value)
}

/// Event sender that keeps every published event
#[derive(Default)]
pub struct RecordingSender {
    events: parking_lot::Mutex<Vec<TaskEvent>>,
}

impl RecordingSender {
    pub fn events(&self) -> Vec<TaskEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl EventSender for RecordingSender {
    async fn publish(&self, event: &TaskEvent) -> Result<(), EventSenderError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// Event sender whose transport is down
#[derive(Default)]
pub struct FailingSender {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl EventSender for FailingSender {
    async fn publish(&self, _event: &TaskEvent) -> Result<(), EventSenderError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(EventSenderError::Transport("broker unreachable".to_string()))
    }
}

/// Repository that delegates to memory until switched off
#[derive(Default)]
pub struct FlakyRepository {
    inner: InMemoryTaskRepository,
    down: AtomicBool,
    pub calls: AtomicUsize,
}

impl FlakyRepository {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            Err(RepositoryError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TaskRepository for FlakyRepository {
    async fn save(&self, task: &Task) -> Result<(), RepositoryError> {
        self.check()?;
        self.inner.save(task).await
    }

    async fn update(&self, task: &Task, expected: TaskStatus) -> Result<bool, RepositoryError> {
        self.check()?;
        self.inner.update(task, expected).await
    }

    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>, RepositoryError> {
        self.check()?;
        self.inner.find_by_id(id).await
    }

    async fn find_all(&self, offset: usize, limit: usize) -> Result<Vec<Task>, RepositoryError> {
        self.check()?;
        self.inner.find_all(offset, limit).await
    }

    async fn delete(&self, id: &TaskId) -> Result<bool, RepositoryError> {
        self.check()?;
        self.inner.delete(id).await
    }
}
