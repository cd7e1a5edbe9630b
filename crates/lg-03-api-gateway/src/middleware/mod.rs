//! Middleware stack for the ledger gateway.
//!
//! Layer order: Request → CORS → Tracing → Timeout → Body limit → Handler

pub mod cors;
pub mod tracing;

pub use cors::create_cors_layer;
pub use tracing::TracingLayer;
