//! REST surface: shared handler state and routes.

pub mod extract;
pub mod handlers;

use crate::domain::config::LedgerConfig;
use axum::routing::{get, post};
use axum::Router;
use lg_01_commit_coordinator::TransactionSubmissionApi;
use lg_02_enrollment_admission::EnrollmentApi;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<dyn TransactionSubmissionApi>,
    pub enrollment: Arc<dyn EnrollmentApi>,
    pub ledger: Arc<LedgerConfig>,
    /// Per-peer commit watch timeout forwarded with every submission
    pub commit_timeout: Option<Duration>,
}

/// All REST routes, without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/enroll", post(handlers::enroll))
        .route("/invoke", post(handlers::invoke))
        .route("/invoke/:chaincode", post(handlers::invoke_chaincode))
        .route("/query", post(handlers::query))
        .route("/query/:chaincode", post(handlers::query_chaincode))
        .route("/upgrade/:chaincode", post(handlers::upgrade))
        .route("/health", get(handlers::health))
}
