//! Domain types for the ledger gateway: configuration, errors, wire bodies
//! and chaincode routing.

pub mod config;
pub mod error;
pub mod routing;
pub mod types;

pub use config::{CorsConfig, GatewayConfig, HttpConfig, LedgerConfig, LimitsConfig, TimeoutConfig};
pub use error::{ApiError, ApiResult, GatewayError};
pub use types::*;
