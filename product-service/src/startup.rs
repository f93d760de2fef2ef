//! Application startup and lifecycle management.
//!
//! Two ways to run: a long-running server that binds `PORT` itself, or, in
//! production, a serverless function where the host runtime owns the socket
//! and hands requests to the router.

use axum::Router;
use service_core::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

use crate::config::ProductConfig;
use crate::services::{Connector, MongoConnector};
use crate::{build_router, AppState};

enum Runtime {
    Server { listener: TcpListener, port: u16 },
    Serverless,
}

pub struct Application {
    router: Router,
    runtime: Runtime,
    state: AppState,
}

impl Application {
    pub async fn build(config: ProductConfig) -> Result<Self, AppError> {
        let connector: Arc<dyn Connector> = Arc::new(MongoConnector::new(config.mongodb.clone()));
        Self::build_with_connector(config, connector).await
    }

    pub async fn build_with_connector(
        config: ProductConfig,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(connector);
        let router = build_router(state.clone());

        let runtime = if config.common.environment().is_serverless() {
            tracing::info!("Serverless mode: the host runtime owns the listener");
            Runtime::Serverless
        } else {
            let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
            let listener = TcpListener::bind(addr).await.map_err(|e| {
                tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
                AppError::from(e)
            })?;
            let port = listener.local_addr()?.port();
            tracing::info!("🚀 Server running on port {}", port);

            // Warm the connection cache; requests still gate on it.
            let connections = state.connections.clone();
            tokio::spawn(async move {
                if let Err(e) = connections.connect().await {
                    tracing::warn!(error = %e, "Initial database connection failed; will retry on demand");
                }
            });

            Runtime::Server { listener, port }
        };

        Ok(Self {
            router,
            runtime,
            state,
        })
    }

    /// Bound port, or `None` under a serverless host.
    pub fn port(&self) -> Option<u16> {
        match &self.runtime {
            Runtime::Server { port, .. } => Some(*port),
            Runtime::Serverless => None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        match self.runtime {
            Runtime::Server { listener, .. } => {
                axum::serve(listener, self.router)
                    .with_graceful_shutdown(shutdown_signal())
                    .await
            }
            Runtime::Serverless => lambda_http::run(self.router)
                .await
                .map_err(std::io::Error::other),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
