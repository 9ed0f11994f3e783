//! In-process event sender implementations.
//!
//! `BroadcastEventSender` fans events out to in-process subscribers over a tokio
//! broadcast channel. `LoggingEventSender` only records each event in the log.
//! External transports implement [`EventSender`] the same way.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::events::TaskEvent;
use crate::ports::{EventSender, EventSenderError};

/// Event sender that broadcasts to in-process subscribers.
///
/// Publishing with no subscribers succeeds. Publishing after [`close`] fails
/// with [`EventSenderError::ChannelClosed`]; clones share the closed flag.
///
/// [`close`]: BroadcastEventSender::close
#[derive(Debug, Clone)]
pub struct BroadcastEventSender {
    sender: broadcast::Sender<TaskEvent>,
    closed: Arc<AtomicBool>,
}

impl BroadcastEventSender {
    /// Create a new sender with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop accepting events, e.g. once subscribers have shut down
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            info!(subscribers = self.sender.receiver_count(), "Event channel closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventSender {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[async_trait]
impl EventSender for BroadcastEventSender {
    async fn publish(&self, event: &TaskEvent) -> Result<(), EventSenderError> {
        if self.is_closed() {
            return Err(EventSenderError::ChannelClosed);
        }

        match self.sender.send(event.clone()) {
            Ok(delivered) => {
                debug!(event_type = %event.event_type, delivered, "Event broadcast");
                Ok(())
            }
            // No subscribers is acceptable: events are published even if no one is listening
            Err(broadcast::error::SendError(_)) => Ok(()),
        }
    }
}

/// Event sender that writes each event to the structured log
#[derive(Debug, Clone, Default)]
pub struct LoggingEventSender;

#[async_trait]
impl EventSender for LoggingEventSender {
    async fn publish(&self, event: &TaskEvent) -> Result<(), EventSenderError> {
        let payload = serde_json::to_string(&event.payload)?;
        info!(
            event_type = %event.event_type,
            task_id = %event.task_id,
            payload = %payload,
            "Sending event"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TaskEventType;
    use crate::models::TaskId;

    #[tokio::test]
    async fn test_broadcast_delivers_to_subscribers() {
        let sender = BroadcastEventSender::new(8);
        let mut receiver = sender.subscribe();
        assert_eq!(sender.subscriber_count(), 1);

        let task_id = TaskId::new();
        sender.publish(&TaskEvent::completed(task_id)).await.unwrap();

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.event_type, TaskEventType::TaskCompleted);
        assert_eq!(received.task_id, task_id);
    }

    #[tokio::test]
    async fn test_broadcast_without_subscribers_succeeds() {
        let sender = BroadcastEventSender::default();
        assert!(sender.publish(&TaskEvent::deleted(TaskId::new())).await.is_ok());
    }

    #[tokio::test]
    async fn test_closed_broadcast_rejects_events() {
        let sender = BroadcastEventSender::new(8);
        let mut receiver = sender.subscribe();
        let shared = sender.clone();

        shared.close();
        assert!(sender.is_closed());
        assert_eq!(
            sender.publish(&TaskEvent::deleted(TaskId::new())).await,
            Err(EventSenderError::ChannelClosed)
        );
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_logging_sender_accepts_events() {
        let sender = LoggingEventSender;
        assert!(sender.publish(&TaskEvent::deleted(TaskId::new())).await.is_ok());
    }
}
