//! gRPC service implementations. Each delegates to the domain service layer.

pub mod task;

pub use task::TaskGrpcService;
