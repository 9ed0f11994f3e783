//! gRPC API for the task service.
//!
//! Mirrors the REST surface one RPC per task operation and reuses the same
//! domain service. Served alongside the REST API by the bootstrap process.
//!
//! ```bash
//! grpcurl -plaintext localhost:50051 list
//! grpcurl -plaintext -d '{"page": 1, "limit": 10}' localhost:50051 task.TaskService/GetAllTasks
//! ```

pub mod conversions;
pub mod proto;
pub mod server;
pub mod services;

pub use server::{GrpcServer, GrpcServerHandle};
pub use services::TaskGrpcService;
