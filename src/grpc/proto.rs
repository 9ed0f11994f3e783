//! Generated protobuf types and tonic service stubs for `proto/task.proto`.

#![allow(clippy::derive_partial_eq_without_eq)]

tonic::include_proto!("task");

/// Encoded file descriptor set for the reflection service
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("task_descriptor");
