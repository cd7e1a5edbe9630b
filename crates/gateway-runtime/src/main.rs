//! # Ledger Gateway
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (`LG_CONFIG` file, then `LG_*` environment)
//! 2. Install the tracing subscriber
//! 3. Wire ledger network, wallet, certificate authority, admission,
//!    enrollment, coordinator and HTTP gateway
//! 4. Enroll the admin identity
//! 5. Serve until Ctrl+C, then drain in-flight requests

use anyhow::{Context, Result};
use gateway_runtime::{logging, GatewayRuntime, RuntimeConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env().context("failed to load configuration")?;
    logging::init(&config.log)?;

    let runtime = GatewayRuntime::new(config)?;

    let shutdown = runtime.shutdown_handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(err) => error!(error = %err, "failed to listen for Ctrl+C, shutting down"),
        }
        shutdown.trigger();
    });

    runtime.run().await
}
