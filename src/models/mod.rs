//! # Domain Models
//!
//! The task entity and the value types the domain service operates on.

pub mod pagination;
pub mod task;

pub use pagination::PageRequest;
pub use task::{
    due_date_from_epoch_seconds, parse_iso8601_due_date, CreateTaskCommand, Task, TaskId,
    TaskStatus, ValidatedCreateTask,
};
