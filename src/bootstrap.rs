//! # Service Bootstrap
//!
//! Wires configuration, the dependency tracker, the protected ports and the
//! domain service into the REST and gRPC servers, and runs both until a
//! shutdown signal arrives.

use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info};

use crate::config::{ConfigManager, ConfigurationError};
use crate::events::event_sender_from_config;
use crate::grpc::{GrpcServer, GrpcServerHandle};
use crate::persistence::repository_from_config;
use crate::ports::{EventSender, TaskRepository};
use crate::resilience::DependencyHealthTracker;
use crate::services::{HealthService, TaskOperations, TaskService};
use crate::web::{create_app, AppState};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Server(String),
}

pub type BootstrapResult<T> = Result<T, BootstrapError>;

/// Fully wired service, ready to start serving
pub struct ServiceBootstrap {
    config_manager: Arc<ConfigManager>,
    tracker: DependencyHealthTracker,
    tasks: Arc<dyn TaskOperations>,
    health: Arc<HealthService>,
}

impl std::fmt::Debug for ServiceBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceBootstrap")
            .field("environment", &self.config_manager.environment())
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

impl ServiceBootstrap {
    /// Build the service with the port adapters named in configuration
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        let config = config_manager.config();
        let repository = repository_from_config(&config.repository);
        let event_sender = event_sender_from_config(&config.event_sender);
        Self::with_ports(config_manager, repository, event_sender)
    }

    /// Build the service around caller-supplied port implementations
    pub fn with_ports(
        config_manager: Arc<ConfigManager>,
        repository: Arc<dyn TaskRepository>,
        event_sender: Arc<dyn EventSender>,
    ) -> Self {
        let config = config_manager.config();
        let tracker = DependencyHealthTracker::from_config(&config.circuit_breakers);
        let tasks: Arc<dyn TaskOperations> = Arc::new(TaskService::from_ports(
            repository,
            event_sender,
            &tracker,
            config,
        ));
        let health = Arc::new(HealthService::new(
            tracker.clone(),
            config_manager.environment(),
        ));

        info!(
            environment = %config_manager.environment(),
            repository_backend = ?config.repository.backend,
            event_sender_backend = ?config.event_sender.backend,
            "🔧 Task service wired"
        );

        Self {
            config_manager,
            tracker,
            tasks,
            health,
        }
    }

    pub fn config_manager(&self) -> &Arc<ConfigManager> {
        &self.config_manager
    }

    pub fn tracker(&self) -> &DependencyHealthTracker {
        &self.tracker
    }

    pub fn tasks(&self) -> Arc<dyn TaskOperations> {
        Arc::clone(&self.tasks)
    }

    pub fn health(&self) -> Arc<HealthService> {
        Arc::clone(&self.health)
    }

    /// The REST application, without binding a listener
    pub fn router(&self) -> Router {
        let state = AppState::new(self.tasks(), self.health());
        create_app(state, self.config_manager.config().rest.request_timeout())
    }

    /// Bind both listeners, then start both servers in the background.
    ///
    /// A listener that cannot be bound fails the start before any server runs.
    pub async fn start(self) -> BootstrapResult<ServiceHandle> {
        let config = self.config_manager.config();

        let (rest_listener, rest_address) = bind_listener(&config.rest.bind_address).await?;
        let grpc_listener = if config.grpc.enabled {
            Some(bind_listener(&config.grpc.bind_address).await?)
        } else {
            info!("gRPC server disabled by configuration");
            None
        };

        let app = self.router();
        let (rest_shutdown_tx, rest_shutdown_rx) = oneshot::channel::<()>();
        let rest_task = tokio::spawn(async move {
            axum::serve(rest_listener, app)
                .with_graceful_shutdown(async {
                    let _ = rest_shutdown_rx.await;
                })
                .await
        });
        info!(address = %rest_address, "🌐 REST server listening");

        let grpc = match grpc_listener {
            Some((listener, address)) => {
                let handle = GrpcServer::new(config.grpc.clone(), self.tasks())
                    .spawn(listener)
                    .map_err(|source| BootstrapError::Bind {
                        address: address.to_string(),
                        source,
                    })?;
                info!(address = %handle.local_addr(), "📡 gRPC server listening");
                Some(handle)
            }
            None => None,
        };

        Ok(ServiceHandle {
            rest_address,
            rest_shutdown: Some(rest_shutdown_tx),
            rest_task,
            grpc,
        })
    }

    /// Serve until `shutdown` resolves, then stop both servers
    pub async fn run_until<F>(self, shutdown: F) -> BootstrapResult<()>
    where
        F: Future<Output = ()>,
    {
        let handle = self.start().await?;
        shutdown.await;
        info!("🛑 Shutdown signal received, stopping servers");
        handle.stop().await
    }
}

async fn bind_listener(address: &str) -> BootstrapResult<(TcpListener, SocketAddr)> {
    let bind_error = |source| BootstrapError::Bind {
        address: address.to_string(),
        source,
    };
    let listener = TcpListener::bind(address).await.map_err(bind_error)?;
    let local_address = listener.local_addr().map_err(bind_error)?;
    Ok((listener, local_address))
}

/// Handle to the running servers
#[derive(Debug)]
pub struct ServiceHandle {
    rest_address: SocketAddr,
    rest_shutdown: Option<oneshot::Sender<()>>,
    rest_task: tokio::task::JoinHandle<std::io::Result<()>>,
    grpc: Option<GrpcServerHandle>,
}

impl ServiceHandle {
    /// The address the REST listener actually bound
    pub fn rest_address(&self) -> SocketAddr {
        self.rest_address
    }

    /// The address the gRPC listener actually bound, when gRPC is enabled
    pub fn grpc_address(&self) -> Option<SocketAddr> {
        self.grpc.as_ref().map(GrpcServerHandle::local_addr)
    }

    pub fn grpc_running(&self) -> bool {
        self.grpc.as_ref().is_some_and(GrpcServerHandle::is_running)
    }

    /// Stop both servers, draining in-flight requests
    pub async fn stop(mut self) -> BootstrapResult<()> {
        if let Some(tx) = self.rest_shutdown.take() {
            let _ = tx.send(());
        }

        let rest_result = match self.rest_task.await {
            Ok(result) => result.map_err(|e| BootstrapError::Server(format!("REST server: {e}"))),
            Err(e) => Err(BootstrapError::Server(format!("REST server task: {e}"))),
        };

        if let Some(grpc) = self.grpc.take() {
            if let Err(e) = grpc.stop().await {
                error!(error = %e, "gRPC server did not stop cleanly");
                return Err(BootstrapError::Server(format!("gRPC server: {e}")));
            }
        }

        info!("✅ Servers stopped");
        rest_result
    }
}
