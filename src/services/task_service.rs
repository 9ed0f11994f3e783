//! # Task Domain Service
//!
//! The single implementation of the task lifecycle behind both the REST and
//! gRPC adapters. All dependency calls go through circuit-breaker-protected
//! ports: repository failures abort the operation, publication failures are
//! logged and recorded against the event sender's health only.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::config::{PaginationConfig, ServiceConfig};
use crate::error::{TaskError, TaskResult};
use crate::events::TaskEvent;
use crate::logging::{log_dependency_failure, log_task_operation};
use crate::models::{CreateTaskCommand, PageRequest, Task, TaskId, TaskStatus};
use crate::ports::{EventSender, RepositoryError, TaskRepository};
use crate::resilience::{
    CircuitBreakerError, Dependency, DependencyHealthTracker, ProtectedEventSender,
    ProtectedTaskRepository,
};

/// Task lifecycle operations shared by every adapter
#[async_trait]
pub trait TaskOperations: Send + Sync {
    /// Validate, persist and announce a new pending task
    async fn create_task(&self, command: CreateTaskCommand) -> TaskResult<Task>;

    /// Fetch a live task. Unknown, malformed and deleted ids are all `NotFound`.
    async fn get_task(&self, task_id: &str) -> TaskResult<Task>;

    /// List live tasks in creation order, 1-indexed pages
    async fn list_tasks(&self, page: Option<u32>, limit: Option<u32>) -> TaskResult<Vec<Task>>;

    /// Complete a task. Completing an already completed task is a no-op.
    async fn complete_task(&self, task_id: &str) -> TaskResult<Task>;

    async fn delete_task(&self, task_id: &str) -> TaskResult<()>;
}

#[derive(Debug, Clone)]
pub struct TaskService {
    repository: ProtectedTaskRepository,
    events: ProtectedEventSender,
    pagination: PaginationConfig,
}

impl TaskService {
    pub fn new(
        repository: ProtectedTaskRepository,
        events: ProtectedEventSender,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            repository,
            events,
            pagination,
        }
    }

    /// Wrap raw ports with the tracker's breakers using service configuration
    pub fn from_ports(
        repository: Arc<dyn TaskRepository>,
        event_sender: Arc<dyn EventSender>,
        tracker: &DependencyHealthTracker,
        config: &ServiceConfig,
    ) -> Self {
        Self::new(
            ProtectedTaskRepository::new(repository, tracker),
            ProtectedEventSender::new(event_sender, tracker, config.event_sender.publish_timeout()),
            config.pagination.clone(),
        )
    }

    /// Publish an event; failures never reach the caller
    async fn announce(&self, event: TaskEvent) {
        match self.events.publish(&event).await {
            Ok(()) => debug!(
                event_type = %event.event_type,
                task_id = %event.task_id,
                "Event published"
            ),
            Err(err) => {
                let err = TaskError::from(err);
                log_dependency_failure(
                    Dependency::EventSender.as_str(),
                    event.event_type.as_str(),
                    &err.to_string(),
                    false,
                );
            }
        }
    }

    async fn find_live(&self, task_id: &str, id: &TaskId) -> TaskResult<Task> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(repository_failure("find_by_id"))?
            .filter(|task| task.status.is_live())
            .ok_or_else(|| TaskError::not_found(task_id))
    }
}

fn parse_task_id(task_id: &str) -> TaskResult<TaskId> {
    task_id.trim().parse().map_err(|_| TaskError::not_found(task_id))
}

fn repository_failure(
    operation: &'static str,
) -> impl Fn(CircuitBreakerError<RepositoryError>) -> TaskError {
    move |err| {
        let err = TaskError::from(err);
        log_dependency_failure(Dependency::Repository.as_str(), operation, &err.to_string(), true);
        err
    }
}

#[async_trait]
impl TaskOperations for TaskService {
    #[instrument(skip(self, command), fields(configuration_id = %command.configuration_id))]
    async fn create_task(&self, command: CreateTaskCommand) -> TaskResult<Task> {
        let validated = command.validate()?;
        let task = Task::new(validated, Utc::now());

        self.repository
            .save(&task)
            .await
            .map_err(repository_failure("save"))?;

        let task_id = task.id.to_string();
        log_task_operation("create_task", Some(&task_id), "success", None);

        self.announce(TaskEvent::created(&task)).await;
        Ok(task)
    }

    #[instrument(skip(self))]
    async fn get_task(&self, task_id: &str) -> TaskResult<Task> {
        let id = parse_task_id(task_id)?;
        self.find_live(task_id, &id).await
    }

    #[instrument(skip(self))]
    async fn list_tasks(&self, page: Option<u32>, limit: Option<u32>) -> TaskResult<Vec<Task>> {
        let request = PageRequest::resolve(page, limit, &self.pagination);
        let tasks = self
            .repository
            .find_all(request.offset(), request.limit())
            .await
            .map_err(repository_failure("find_all"))?;

        debug!(
            page = request.page,
            limit = request.limit,
            returned = tasks.len(),
            "Listed tasks"
        );
        Ok(tasks)
    }

    #[instrument(skip(self))]
    async fn complete_task(&self, task_id: &str) -> TaskResult<Task> {
        let id = parse_task_id(task_id)?;
        let mut task = self
            .repository
            .find_by_id(&id)
            .await
            .map_err(repository_failure("find_by_id"))?
            .ok_or_else(|| TaskError::not_found(task_id))?;

        if !task.complete(Utc::now())? {
            log_task_operation("complete_task", Some(task_id), "unchanged", Some("already completed"));
            return Ok(task);
        }

        let updated = self
            .repository
            .update(&task, TaskStatus::Pending)
            .await
            .map_err(repository_failure("update"))?;

        if !updated {
            // Another writer moved the task on between the read and the write.
            let current = self
                .repository
                .find_by_id(&id)
                .await
                .map_err(repository_failure("find_by_id"))?;
            return match current {
                Some(current) if current.status == TaskStatus::Completed => {
                    log_task_operation(
                        "complete_task",
                        Some(task_id),
                        "unchanged",
                        Some("completed concurrently"),
                    );
                    Ok(current)
                }
                Some(current) if current.status == TaskStatus::Deleted => Err(TaskError::invalid_state(
                    task_id,
                    "deleted tasks cannot be completed",
                )),
                _ => Err(TaskError::not_found(task_id)),
            };
        }

        log_task_operation("complete_task", Some(task_id), "success", None);
        self.announce(TaskEvent::completed(task.id)).await;
        Ok(task)
    }

    #[instrument(skip(self))]
    async fn delete_task(&self, task_id: &str) -> TaskResult<()> {
        let id = parse_task_id(task_id)?;
        let deleted = self
            .repository
            .delete(&id)
            .await
            .map_err(repository_failure("delete"))?;

        if !deleted {
            return Err(TaskError::not_found(task_id));
        }

        log_task_operation("delete_task", Some(task_id), "success", None);
        self.announce(TaskEvent::deleted(id)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TombstonePolicy;
    use crate::events::{BroadcastEventSender, TaskEventType};
    use crate::persistence::InMemoryTaskRepository;
    use crate::ports::EventSenderError;
    use crate::resilience::CircuitState;
    use chrono::Duration as ChronoDuration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingSender {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl EventSender for FailingSender {
        async fn publish(&self, _event: &TaskEvent) -> Result<(), EventSenderError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(EventSenderError::Transport("broker unreachable".to_string()))
        }
    }

    struct FailingRepository;

    #[async_trait]
    impl TaskRepository for FailingRepository {
        async fn save(&self, _task: &Task) -> Result<(), RepositoryError> {
            Err(RepositoryError::Storage("write rejected".to_string()))
        }

        async fn update(&self, _task: &Task, _expected: TaskStatus) -> Result<bool, RepositoryError> {
            Err(RepositoryError::Storage("write rejected".to_string()))
        }

        async fn find_by_id(&self, _id: &TaskId) -> Result<Option<Task>, RepositoryError> {
            Err(RepositoryError::Storage("read rejected".to_string()))
        }

        async fn find_all(&self, _offset: usize, _limit: usize) -> Result<Vec<Task>, RepositoryError> {
            Err(RepositoryError::Storage("read rejected".to_string()))
        }

        async fn delete(&self, _id: &TaskId) -> Result<bool, RepositoryError> {
            Err(RepositoryError::Storage("write rejected".to_string()))
        }
    }

    /// Holds the first two reads until both callers have read the same record
    struct SharedReadRepository {
        inner: InMemoryTaskRepository,
        gate: tokio::sync::Barrier,
        reads: AtomicUsize,
    }

    impl SharedReadRepository {
        fn new() -> Self {
            Self {
                inner: InMemoryTaskRepository::default(),
                gate: tokio::sync::Barrier::new(2),
                reads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TaskRepository for SharedReadRepository {
        async fn save(&self, task: &Task) -> Result<(), RepositoryError> {
            self.inner.save(task).await
        }

        async fn update(&self, task: &Task, expected: TaskStatus) -> Result<bool, RepositoryError> {
            self.inner.update(task, expected).await
        }

        async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>, RepositoryError> {
            let found = self.inner.find_by_id(id).await;
            if self.reads.fetch_add(1, Ordering::SeqCst) < 2 {
                self.gate.wait().await;
            }
            found
        }

        async fn find_all(&self, offset: usize, limit: usize) -> Result<Vec<Task>, RepositoryError> {
            self.inner.find_all(offset, limit).await
        }

        async fn delete(&self, id: &TaskId) -> Result<bool, RepositoryError> {
            self.inner.delete(id).await
        }
    }

    /// Lets a delete land between a completion's read and its write
    struct DeleteDuringCompleteRepository {
        inner: InMemoryTaskRepository,
        read_done: tokio::sync::Barrier,
        deleted: tokio::sync::Notify,
        reads: AtomicUsize,
    }

    impl DeleteDuringCompleteRepository {
        fn new(policy: TombstonePolicy) -> Self {
            Self {
                inner: InMemoryTaskRepository::new(policy),
                read_done: tokio::sync::Barrier::new(2),
                deleted: tokio::sync::Notify::new(),
                reads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TaskRepository for DeleteDuringCompleteRepository {
        async fn save(&self, task: &Task) -> Result<(), RepositoryError> {
            self.inner.save(task).await
        }

        async fn update(&self, task: &Task, expected: TaskStatus) -> Result<bool, RepositoryError> {
            self.deleted.notified().await;
            self.inner.update(task, expected).await
        }

        async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>, RepositoryError> {
            let found = self.inner.find_by_id(id).await;
            if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
                self.read_done.wait().await;
            }
            found
        }

        async fn find_all(&self, offset: usize, limit: usize) -> Result<Vec<Task>, RepositoryError> {
            self.inner.find_all(offset, limit).await
        }

        async fn delete(&self, id: &TaskId) -> Result<bool, RepositoryError> {
            self.read_done.wait().await;
            let deleted = self.inner.delete(id).await;
            self.deleted.notify_one();
            deleted
        }
    }

    fn drain_event_types(
        events: &mut tokio::sync::broadcast::Receiver<TaskEvent>,
    ) -> Vec<TaskEventType> {
        let mut types = Vec::new();
        while let Ok(event) = events.try_recv() {
            types.push(event.event_type);
        }
        types
    }

    fn command() -> CreateTaskCommand {
        CreateTaskCommand {
            configuration_id: "cfg-1".to_string(),
            location_id: "loc-1".to_string(),
            user_id: Some("user-1".to_string()),
            role_id: None,
            due_date: Some(Utc::now() + ChronoDuration::days(1)),
        }
    }

    fn service_with(
        repository: Arc<dyn TaskRepository>,
        sender: Arc<dyn EventSender>,
    ) -> (TaskService, DependencyHealthTracker) {
        let tracker = DependencyHealthTracker::default();
        let service = TaskService::from_ports(repository, sender, &tracker, &ServiceConfig::default());
        (service, tracker)
    }

    #[tokio::test]
    async fn test_create_persists_and_publishes() {
        let sender = Arc::new(BroadcastEventSender::new(16));
        let mut events = sender.subscribe();
        let (service, _) = service_with(Arc::new(InMemoryTaskRepository::default()), sender);

        let task = service.create_task(command()).await.unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(service.get_task(&task.id.to_string()).await.unwrap(), task);

        let event = events.recv().await.unwrap();
        assert_eq!(event.event_type, TaskEventType::TaskCreated);
        assert_eq!(event.task_id, task.id);
        assert_eq!(event.payload["configuration_id"], "cfg-1");
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let (service, _) = service_with(
            Arc::new(InMemoryTaskRepository::default()),
            Arc::new(BroadcastEventSender::default()),
        );

        let mut missing_due = command();
        missing_due.due_date = None;
        assert!(matches!(
            service.create_task(missing_due).await,
            Err(TaskError::Validation(_))
        ));

        let mut blank_configuration = command();
        blank_configuration.configuration_id = "  ".to_string();
        assert!(matches!(
            service.create_task(blank_configuration).await,
            Err(TaskError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_publication_failure_does_not_fail_mutations() {
        let sender = Arc::new(FailingSender {
            attempts: AtomicUsize::new(0),
        });
        let (service, tracker) =
            service_with(Arc::new(InMemoryTaskRepository::default()), sender.clone());

        let task = service.create_task(command()).await.unwrap();
        let id = task.id.to_string();
        assert!(service.complete_task(&id).await.unwrap().is_completed());
        service.delete_task(&id).await.unwrap();

        assert_eq!(sender.attempts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.state(Dependency::EventSender), CircuitState::Open);
        assert_eq!(tracker.state(Dependency::Repository), CircuitState::Closed);

        // Breaker open: the sender is no longer called, mutations still succeed.
        service.create_task(command()).await.unwrap();
        assert_eq!(sender.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_closed_event_channel_degrades_sender_only() {
        let sender = Arc::new(BroadcastEventSender::new(16));
        sender.close();
        let (service, tracker) =
            service_with(Arc::new(InMemoryTaskRepository::default()), sender);

        for _ in 0..3 {
            service.create_task(command()).await.unwrap();
        }

        let report = tracker.report(Dependency::EventSender);
        assert_eq!(report.state, CircuitState::Open);
        assert_eq!(report.metrics.total_failures, 3);
        assert_eq!(tracker.state(Dependency::Repository), CircuitState::Closed);
        assert_eq!(service.list_tasks(None, None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_persistence_failure_publishes_nothing() {
        let sender = Arc::new(BroadcastEventSender::new(16));
        let mut events = sender.subscribe();
        let (service, _) = service_with(Arc::new(FailingRepository), sender);

        let result = service.create_task(command()).await;
        assert!(matches!(result, Err(TaskError::Persistence(_))));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_repository_breaker_fails_fast() {
        let (service, tracker) =
            service_with(Arc::new(FailingRepository), Arc::new(BroadcastEventSender::default()));

        for _ in 0..5 {
            assert!(matches!(service.list_tasks(None, None).await, Err(TaskError::Persistence(_))));
        }
        assert_eq!(tracker.state(Dependency::Repository), CircuitState::Open);

        let result = service.create_task(command()).await;
        assert_eq!(
            result,
            Err(TaskError::DependencyUnavailable {
                dependency: "repository".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_complete_is_idempotent() {
        let sender = Arc::new(BroadcastEventSender::new(16));
        let mut events = sender.subscribe();
        let (service, _) = service_with(Arc::new(InMemoryTaskRepository::default()), sender);

        let task = service.create_task(command()).await.unwrap();
        let id = task.id.to_string();
        let first = service.complete_task(&id).await.unwrap();
        let second = service.complete_task(&id).await.unwrap();

        assert!(first.is_completed());
        assert_eq!(first, second);

        assert_eq!(events.recv().await.unwrap().event_type, TaskEventType::TaskCreated);
        assert_eq!(events.recv().await.unwrap().event_type, TaskEventType::TaskCompleted);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_completes_publish_once_and_agree() {
        let repository = Arc::new(SharedReadRepository::new());
        let sender = Arc::new(BroadcastEventSender::new(16));
        let mut events = sender.subscribe();
        let (service, _) = service_with(repository.clone(), sender);
        let service = Arc::new(service);

        let task = service.create_task(command()).await.unwrap();
        let id = task.id.to_string();

        let first = tokio::spawn({
            let service = Arc::clone(&service);
            let id = id.clone();
            async move { service.complete_task(&id).await }
        });
        let second = tokio::spawn({
            let service = Arc::clone(&service);
            let id = id.clone();
            async move { service.complete_task(&id).await }
        });

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();
        let stored = repository.inner.find_by_id(&task.id).await.unwrap().unwrap();

        assert!(stored.is_completed());
        assert_eq!(first.completed_at, stored.completed_at);
        assert_eq!(second.completed_at, stored.completed_at);

        let completed = drain_event_types(&mut events)
            .into_iter()
            .filter(|t| *t == TaskEventType::TaskCompleted)
            .count();
        assert_eq!(completed, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_delete_during_complete_is_not_undone() {
        for (policy, expect_invalid_state) in
            [(TombstonePolicy::Purge, false), (TombstonePolicy::Retain, true)]
        {
            let repository = Arc::new(DeleteDuringCompleteRepository::new(policy));
            let sender = Arc::new(BroadcastEventSender::new(16));
            let mut events = sender.subscribe();
            let (service, _) = service_with(repository.clone(), sender);
            let service = Arc::new(service);

            let task = service.create_task(command()).await.unwrap();
            let id = task.id.to_string();

            let complete = tokio::spawn({
                let service = Arc::clone(&service);
                let id = id.clone();
                async move { service.complete_task(&id).await }
            });
            let delete = tokio::spawn({
                let service = Arc::clone(&service);
                let id = id.clone();
                async move { service.delete_task(&id).await }
            });

            delete.await.unwrap().unwrap();
            let completion = complete.await.unwrap();
            if expect_invalid_state {
                assert!(matches!(completion, Err(TaskError::InvalidState { .. })));
            } else {
                assert!(matches!(completion, Err(TaskError::NotFound { .. })));
            }

            assert!(matches!(service.get_task(&id).await, Err(TaskError::NotFound { .. })));
            let types = drain_event_types(&mut events);
            assert!(!types.contains(&TaskEventType::TaskCompleted));
            assert!(types.contains(&TaskEventType::TaskDeleted));
        }
    }

    #[tokio::test]
    async fn test_delete_then_lookups_are_not_found() {
        let (service, _) = service_with(
            Arc::new(InMemoryTaskRepository::default()),
            Arc::new(BroadcastEventSender::default()),
        );

        let task = service.create_task(command()).await.unwrap();
        let id = task.id.to_string();
        service.delete_task(&id).await.unwrap();

        assert!(matches!(service.get_task(&id).await, Err(TaskError::NotFound { .. })));
        assert!(matches!(service.delete_task(&id).await, Err(TaskError::NotFound { .. })));
        assert!(matches!(service.complete_task(&id).await, Err(TaskError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_completing_tombstoned_task_is_invalid_state() {
        let (service, _) = service_with(
            Arc::new(InMemoryTaskRepository::new(TombstonePolicy::Retain)),
            Arc::new(BroadcastEventSender::default()),
        );

        let task = service.create_task(command()).await.unwrap();
        let id = task.id.to_string();
        service.delete_task(&id).await.unwrap();

        assert!(matches!(service.get_task(&id).await, Err(TaskError::NotFound { .. })));
        assert!(matches!(
            service.complete_task(&id).await,
            Err(TaskError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_and_unknown_ids_are_not_found() {
        let (service, _) = service_with(
            Arc::new(InMemoryTaskRepository::default()),
            Arc::new(BroadcastEventSender::default()),
        );

        assert!(matches!(service.get_task("not-a-uuid").await, Err(TaskError::NotFound { .. })));
        assert!(matches!(
            service.get_task(&TaskId::new().to_string()).await,
            Err(TaskError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_pages_in_creation_order() {
        let (service, _) = service_with(
            Arc::new(InMemoryTaskRepository::default()),
            Arc::new(BroadcastEventSender::default()),
        );

        let mut created = Vec::new();
        for _ in 0..5 {
            created.push(service.create_task(command()).await.unwrap().id);
        }

        let first: Vec<_> = service
            .list_tasks(Some(1), Some(2))
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        let third: Vec<_> = service
            .list_tasks(Some(3), Some(2))
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();

        assert_eq!(first, created[0..2]);
        assert_eq!(third, created[4..5]);
        assert_eq!(service.list_tasks(Some(0), Some(0)).await.unwrap().len(), 5);
        assert!(service.list_tasks(Some(9), None).await.unwrap().is_empty());
    }
}
