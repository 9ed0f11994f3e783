//! # Task Events
//!
//! Domain events emitted on task lifecycle transitions and the in-process
//! senders that deliver them.

pub mod publisher;
pub mod types;

use std::sync::Arc;

use crate::config::{EventSenderBackend, EventSenderConfig};
use crate::ports::EventSender;

pub use publisher::{BroadcastEventSender, LoggingEventSender};
pub use types::{TaskEvent, TaskEventType};

/// Build the configured event sender backend
pub fn event_sender_from_config(config: &EventSenderConfig) -> Arc<dyn EventSender> {
    match config.backend {
        EventSenderBackend::Logging => Arc::new(LoggingEventSender),
        EventSenderBackend::Broadcast => Arc::new(BroadcastEventSender::new(config.channel_capacity)),
    }
}
