//! # Error Types
//!
//! Errors raised at the boundary with the external ledger platform.

use crate::entities::{IdentityKey, PeerId};
use thiserror::Error;

/// Identity resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// No credentials stored for this identity.
    #[error("An identity for the user \"{0}\" does not exist in the wallet")]
    NotFound(IdentityKey),

    /// The wallet backend failed.
    #[error("Identity store error: {0}")]
    Store(String),
}

/// Failures reported by the ledger client or an event source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Channel is not declared in the network configuration.
    #[error("Channel {0} was not defined in the connection profile")]
    ChannelNotFound(String),

    /// A participant could not be reached or hung up.
    #[error("transport failure at {peer}: {cause}")]
    Transport { peer: PeerId, cause: String },

    /// The event source rejected the watch registration.
    #[error("event registration failed at {peer}: {cause}")]
    Registration { peer: PeerId, cause: String },
}

impl LedgerError {
    pub fn transport(peer: &PeerId, cause: impl Into<String>) -> Self {
        Self::Transport {
            peer: peer.clone(),
            cause: cause.into(),
        }
    }
}
