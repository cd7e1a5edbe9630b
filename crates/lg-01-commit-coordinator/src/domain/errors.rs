//! Error taxonomy of the commit coordinator.

use shared_types::{IdentityError, IdentityKey, LedgerError, PeerId};
use thiserror::Error;

/// Everything a submit or evaluate call can surface to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// Signer has no credentials; raised before any network call.
    #[error("identity \"{0}\" is not enrolled")]
    IdentityNotFound(IdentityKey),

    /// Credential store could not be read.
    #[error("identity store unavailable: {0}")]
    IdentityUnavailable(String),

    /// Target channel is not declared in the network configuration.
    #[error("channel {0} was not defined in the connection profile")]
    ChannelNotFound(String),

    /// At least one endorser errored or answered with a non-success status.
    #[error("endorsement rejected: {}", causes.join("; "))]
    EndorsementRejected { causes: Vec<String> },

    /// Ordering service refused the transaction.
    #[error("failed to order the transaction, status code: {status_code}")]
    OrderingFailed { status_code: String },

    /// No commit event from `peer_id` within the watch timeout.
    #[error("REQUEST_TIMEOUT: no commit event from {peer_id}")]
    CommitTimeout { peer_id: PeerId },

    /// Peer committed the transaction as invalid.
    #[error("transaction was invalid on {peer_id}, code: {validation_code}")]
    CommitInvalid {
        peer_id: PeerId,
        validation_code: String,
    },

    /// A participant could not be reached.
    #[error("transport error at {peer_id}: {cause}")]
    TransportError { peer_id: PeerId, cause: String },
}

impl From<IdentityError> for CoordinatorError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotFound(key) => CoordinatorError::IdentityNotFound(key),
            IdentityError::Store(cause) => CoordinatorError::IdentityUnavailable(cause),
        }
    }
}

impl From<LedgerError> for CoordinatorError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::ChannelNotFound(channel) => CoordinatorError::ChannelNotFound(channel),
            LedgerError::Transport { peer, cause } | LedgerError::Registration { peer, cause } => {
                CoordinatorError::TransportError {
                    peer_id: peer,
                    cause,
                }
            }
        }
    }
}
