//! # Gateway Runtime Library
//!
//! Exposes configuration loading, logging setup and service wiring of the
//! ledger gateway binary so they can be tested. The entry point is `main.rs`.

pub mod config;
pub mod logging;
pub mod runtime;

pub use config::{LogConfig, LogFormat, NetworkConfig, RuntimeConfig};
pub use runtime::GatewayRuntime;
