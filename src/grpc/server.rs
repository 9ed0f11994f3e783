//! gRPC server setup and configuration.
//!
//! Registers the task service plus, when enabled, the standard
//! `grpc.health.v1` service and server reflection.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tonic::transport::server::TcpIncoming;
use tonic::transport::Server;
use tracing::{error, info};

use crate::config::GrpcConfig;
use crate::grpc::proto::{task_service_server::TaskServiceServer, FILE_DESCRIPTOR_SET};
use crate::grpc::services::TaskGrpcService;
use crate::services::TaskOperations;

pub type GrpcServerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// gRPC server wrapper.
///
/// Manages the lifecycle of the gRPC server, including service registration,
/// reflection, and health checking.
pub struct GrpcServer {
    config: GrpcConfig,
    tasks: Arc<dyn TaskOperations>,
}

impl std::fmt::Debug for GrpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrpcServer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GrpcServer {
    pub fn new(config: GrpcConfig, tasks: Arc<dyn TaskOperations>) -> Self {
        Self { config, tasks }
    }

    /// Serve until the process is stopped.
    /// Bind the configured address and serve until the process exits
    pub async fn serve(self) -> GrpcServerResult<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> GrpcServerResult<()>
    where
        F: Future<Output = ()> + Send,
    {
        let addr: SocketAddr = self.config.bind_address.parse().map_err(|e| {
            format!(
                "Invalid gRPC bind address '{}': {}",
                self.config.bind_address, e
            )
        })?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| format!("Failed to bind gRPC address {addr}: {e}"))?;

        self.serve_with_listener(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve_with_listener<F>(self, listener: TcpListener, shutdown: F) -> GrpcServerResult<()>
    where
        F: Future<Output = ()> + Send,
    {
        let local_addr = listener.local_addr()?;

        info!(
            address = %local_addr,
            reflection = self.config.enable_reflection,
            health = self.config.enable_health_service,
            "Starting gRPC server"
        );

        let task_service = TaskGrpcService::new(Arc::clone(&self.tasks));

        let mut server = Server::builder().timeout(self.config.request_timeout());
        let mut router = server.add_service(TaskServiceServer::new(task_service));

        if self.config.enable_reflection {
            let reflection_service = tonic_reflection::server::Builder::configure()
                .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
                .build_v1()
                .map_err(|e| format!("Failed to build reflection service: {e}"))?;

            router = router.add_service(reflection_service);
            info!("gRPC reflection service enabled");
        }

        if self.config.enable_health_service {
            let (health_reporter, grpc_health_service) = tonic_health::server::health_reporter();
            health_reporter
                .set_serving::<TaskServiceServer<TaskGrpcService>>()
                .await;

            router = router.add_service(grpc_health_service);
            info!("gRPC health service (grpc.health.v1) enabled");
        }

        router
            .serve_with_incoming_shutdown(TcpIncoming::from(listener), shutdown)
            .await
            .map_err(|e| {
                error!(error = %e, "gRPC server error");
                e
            })?;

        info!("gRPC server stopped");
        Ok(())
    }

    /// Serve on `listener` in a background task.
    ///
    /// Binding is the caller's job, so an unusable address fails before any
    /// task is spawned.
    pub fn spawn(self, listener: TcpListener) -> std::io::Result<GrpcServerHandle> {
        let local_addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
                info!("gRPC server shutting down");
            };
            self.serve_with_listener(listener, shutdown).await
        });

        Ok(GrpcServerHandle {
            shutdown_tx: Some(shutdown_tx),
            handle,
            local_addr,
        })
    }
}

#[derive(Debug)]
pub struct GrpcServerHandle {
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<GrpcServerResult<()>>,
    local_addr: SocketAddr,
}

impl GrpcServerHandle {
    /// The address the listener actually bound
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `false` once the serve task has exited, cleanly or not
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Signal shutdown and wait for the server, surfacing any serve error
    pub async fn stop(mut self) -> GrpcServerResult<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.handle.await?
    }
}
