//! # Persistence
//!
//! In-process implementations of the repository port.

pub mod in_memory;

use std::sync::Arc;

use crate::config::{RepositoryBackend, RepositoryConfig};
use crate::ports::TaskRepository;

pub use in_memory::InMemoryTaskRepository;

/// Build the configured repository backend
pub fn repository_from_config(config: &RepositoryConfig) -> Arc<dyn TaskRepository> {
    match config.backend {
        RepositoryBackend::Memory => Arc::new(InMemoryTaskRepository::new(config.tombstone_policy)),
    }
}
