//! Event sender port: the publish contract for task domain events.

use async_trait::async_trait;
use thiserror::Error;

use crate::events::TaskEvent;

/// Failures of the event transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventSenderError {
    #[error("Event channel is closed")]
    ChannelClosed,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Publish timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl From<serde_json::Error> for EventSenderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Publish contract for task domain events
#[async_trait]
pub trait EventSender: Send + Sync {
    async fn publish(&self, event: &TaskEvent) -> Result<(), EventSenderError>;
}
