//! # LG-03: API Gateway
//!
//! HTTP facade over the commit coordinator and the enrollment service.
//!
//! ```text
//! ┌──────────────────────────── lg-03-api-gateway ────────────────────────────┐
//! │  CORS → Tracing → Timeout → Body limit                                    │
//! │                                                                           │
//! │  POST /enroll ───────────────────────────→ EnrollmentApi (lg-02)          │
//! │  POST /invoke[/:chaincode]   ─┐                                           │
//! │  POST /upgrade/:chaincode    ─┼─ route ──→ TransactionSubmissionApi       │
//! │  POST /query[/:chaincode]    ─┘            (lg-01)                        │
//! │  GET  /health                                                             │
//! └───────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The caller identity travels in the `x-ledger-user` header. Invocations
//! without a chaincode in the path are routed by function name, falling back
//! to the default chaincode. Errors are rendered as
//! `{"success": false, "message": ...}` with a status per failure class.
//!
//! # Usage
//!
//! ```ignore
//! use lg_03_api_gateway::{GatewayConfig, LedgerGatewayService};
//!
//! let service = LedgerGatewayService::new(GatewayConfig::default(), coordinator, enrollment)?;
//! service.start().await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod middleware;
pub mod rest;
pub mod service;

pub use domain::{
    ApiError, ApiResult, CorsConfig, GatewayConfig, GatewayError, HttpConfig, LedgerConfig,
    LimitsConfig, TimeoutConfig, USER_HEADER,
};
pub use rest::AppState;
pub use service::{LedgerGatewayService, ShutdownHandle};
