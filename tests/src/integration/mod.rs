//! Cross-crate integration tests.

pub mod enrollment;
pub mod http;
pub mod properties;
pub mod scenarios;
