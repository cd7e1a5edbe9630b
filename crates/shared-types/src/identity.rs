//! # Identity Port
//!
//! Resolves a logical identity to the credentials used for signing.

use crate::entities::{Credentials, IdentityKey};
use crate::errors::IdentityError;
use async_trait::async_trait;

/// Source of network credentials (wallet, HSM, ...).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve `key` to its credentials.
    ///
    /// Returns `IdentityError::NotFound` when the identity was never enrolled.
    async fn resolve(&self, key: &IdentityKey) -> Result<Credentials, IdentityError>;
}
