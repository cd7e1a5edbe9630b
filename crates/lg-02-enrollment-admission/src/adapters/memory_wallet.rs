//! In-memory identity wallet.

use crate::ports::outbound::IdentityWallet;
use async_trait::async_trait;
use dashmap::DashMap;
use shared_types::{Credentials, IdentityError, IdentityKey, IdentityProvider};
use tracing::info;

/// Wallet keeping credentials in process memory.
///
/// Also serves as the coordinator's `IdentityProvider`, so an identity is
/// usable for signing as soon as enrollment stores it.
#[derive(Debug, Default)]
pub struct MemoryWallet {
    identities: DashMap<IdentityKey, Credentials>,
}

impl MemoryWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.identities.contains_key(key)
    }
}

#[async_trait]
impl IdentityWallet for MemoryWallet {
    async fn get(&self, key: &IdentityKey) -> Result<Option<Credentials>, IdentityError> {
        Ok(self.identities.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, credentials: Credentials) -> Result<(), IdentityError> {
        info!(
            identity = %credentials.identity,
            fingerprint = %credentials.fingerprint(),
            "identity imported into the wallet"
        );
        self.identities
            .insert(credentials.identity.clone(), credentials);
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for MemoryWallet {
    async fn resolve(&self, key: &IdentityKey) -> Result<Credentials, IdentityError> {
        self.identities
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| IdentityError::NotFound(key.clone()))
    }
}
