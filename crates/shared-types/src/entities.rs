//! # Core Domain Entities
//!
//! Identity and correlation types used by every ledger gateway crate.
//!
//! ## Clusters
//!
//! - **Identity**: `IdentityKey`, `Credentials`, `MspId`
//! - **Network**: `PeerId`, `ChannelName`
//! - **Correlation**: `TransactionId`

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Logical identity of a caller (the wallet label / enrollment id).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Membership service provider an identity belongs to (e.g. `CoinsMSP`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MspId(pub String);

impl fmt::Display for MspId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// X.509 network credentials held in the identity wallet.
///
/// The private key never leaves the process; `Debug` redacts it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Identity these credentials were issued to.
    pub identity: IdentityKey,
    /// Owning membership service provider.
    pub msp_id: MspId,
    /// PEM-encoded certificate.
    pub certificate: String,
    /// PEM-encoded private key.
    pub private_key: String,
}

impl Credentials {
    /// Short fingerprint of the certificate, safe to log.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.certificate.as_bytes());
        hex::encode(&digest[..8])
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("msp_id", &self.msp_id)
            .field("fingerprint", &self.fingerprint())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// CLUSTER B: NETWORK
// =============================================================================

/// Network address/name of a ledger participant (endorser, orderer, event source).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Name of a channel declared in the network configuration.
pub type ChannelName = String;

// =============================================================================
// CLUSTER C: CORRELATION
// =============================================================================

/// Identifier correlating one proposal, its ordering submission and every
/// commit watch registered for it.
///
/// Derived as `sha256(nonce || creator)`, so the id is bound to the identity
/// that signs the transaction. A fresh nonce is drawn per call, so ids are
/// never reused.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Allocate a new id bound to the signing identity.
    pub fn generate(signer: &Credentials) -> Self {
        let nonce = Uuid::new_v4();
        let mut hasher = Sha256::new();
        hasher.update(nonce.as_bytes());
        hasher.update(signer.msp_id.0.as_bytes());
        hasher.update(signer.certificate.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap an id received from the wire.
    pub fn from_wire(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
