//! Ledger gateway service - HTTP entry point.

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::middleware::{create_cors_layer, TracingLayer};
use crate::rest::{self, AppState};
use axum::extract::DefaultBodyLimit;
use axum::Router;
use lg_01_commit_coordinator::TransactionSubmissionApi;
use lg_02_enrollment_admission::EnrollmentApi;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

/// Ledger gateway service state
pub struct LedgerGatewayService {
    config: GatewayConfig,
    state: AppState,
    shutdown: Arc<Notify>,
}

impl LedgerGatewayService {
    /// Create a new gateway over a coordinator and an enrollment service
    pub fn new(
        config: GatewayConfig,
        coordinator: Arc<dyn TransactionSubmissionApi>,
        enrollment: Arc<dyn EnrollmentApi>,
    ) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let state = AppState {
            coordinator,
            enrollment,
            ledger: Arc::new(config.ledger.clone()),
            commit_timeout: config.timeouts.commit,
        };

        Ok(Self {
            config,
            state,
            shutdown: Arc::new(Notify::new()),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Bind the configured address and serve until shutdown is triggered
    pub async fn start(&self) -> Result<(), GatewayError> {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| GatewayError::Bind { addr, source })?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until shutdown is triggered
    pub async fn serve(&self, listener: TcpListener) -> Result<(), GatewayError> {
        info!(
            addr = %listener.local_addr()?,
            channel = %self.config.ledger.channel,
            "Starting ledger gateway"
        );

        let shutdown = Arc::clone(&self.shutdown);
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { shutdown.notified().await })
            .await?;

        info!("Ledger gateway stopped");
        Ok(())
    }

    /// Trigger graceful shutdown. Safe to call before `serve`.
    pub fn shutdown(&self) {
        self.shutdown_handle().trigger();
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(Arc::clone(&self.shutdown))
    }

    /// HTTP router with the full middleware stack
    pub fn router(&self) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(create_cors_layer(&self.config.cors))
            .layer(TracingLayer::new())
            .layer(TimeoutLayer::new(self.config.timeouts.request))
            .layer(DefaultBodyLimit::max(self.config.limits.max_request_size));

        rest::routes()
            .layer(middleware)
            .with_state(self.state.clone())
    }
}

/// Stops a running gateway from another task.
#[derive(Clone)]
pub struct ShutdownHandle(Arc<Notify>);

impl ShutdownHandle {
    pub fn trigger(&self) {
        self.0.notify_one();
    }
}
