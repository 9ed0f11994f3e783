//! # Ports
//!
//! Abstract contracts for the two external dependencies of the domain service.
//! Concrete storage engines and message transports plug in behind these traits;
//! the crate ships in-process implementations in [`crate::persistence`] and
//! [`crate::events`].

pub mod event_sender;
pub mod repository;

pub use event_sender::{EventSender, EventSenderError};
pub use repository::{RepositoryError, TaskRepository};
