//! Domain entities for the commit coordinator.

use serde::{Deserialize, Serialize};
use shared_types::{ChannelName, IdentityKey, PeerId, TransactionId};
use std::collections::BTreeMap;
use std::time::Duration;

// =============================================================================
// REQUESTS
// =============================================================================

/// A state-changing operation to submit and confirm.
#[derive(Clone, Debug)]
pub struct SubmitRequest {
    /// Identity that signs the proposal and the ordering envelope. May differ
    /// from the end user who triggered the call (e.g. admin-signed upgrades).
    pub signer: IdentityKey,
    pub channel: ChannelName,
    pub chaincode: String,
    /// Set for deployments/upgrades.
    pub version: Option<String>,
    pub function: String,
    pub args: Vec<String>,
    /// Per-peer commit watch timeout; the configured default when `None`.
    pub commit_timeout: Option<Duration>,
}

/// A read-only evaluation: endorse, but never order or watch.
#[derive(Clone, Debug)]
pub struct EvaluateRequest {
    pub signer: IdentityKey,
    pub channel: ChannelName,
    pub chaincode: String,
    pub function: String,
    pub args: Vec<String>,
}

/// The proposal sent, unchanged, to every endorser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalRequest {
    pub chaincode: String,
    pub version: Option<String>,
    pub function: String,
    pub args: Vec<String>,
    pub transaction_id: TransactionId,
}

impl ProposalRequest {
    /// Deployment and upgrade proposals carry a chaincode version.
    pub fn is_upgrade(&self) -> bool {
        self.version.is_some()
    }
}

// =============================================================================
// ENDORSEMENT
// =============================================================================

/// A structured answer from an endorser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalResponse {
    pub status: u32,
    pub message: String,
    pub payload: Vec<u8>,
    /// Endorser signature over the proposal response.
    pub signature: Vec<u8>,
}

/// What one endorser produced for a proposal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endorsement {
    Endorsed(ProposalResponse),
    Failed { cause: String },
}

/// One endorser's answer, attributable to its origin peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndorsementResponse {
    pub peer: PeerId,
    pub endorsement: Endorsement,
}

impl EndorsementResponse {
    pub fn endorsed(peer: PeerId, response: ProposalResponse) -> Self {
        Self {
            peer,
            endorsement: Endorsement::Endorsed(response),
        }
    }

    pub fn failed(peer: PeerId, cause: impl Into<String>) -> Self {
        Self {
            peer,
            endorsement: Endorsement::Failed {
                cause: cause.into(),
            },
        }
    }
}

// =============================================================================
// ORDERING
// =============================================================================

/// Everything the ordering service needs to sequence a transaction.
#[derive(Clone, Debug)]
pub struct OrderingSubmission {
    pub transaction_id: TransactionId,
    pub endorsements: Vec<EndorsementResponse>,
    pub proposal: ProposalRequest,
}

/// Raw answer of the ordering service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderingOutcome {
    pub status: String,
    pub info: Option<String>,
}

/// Ordering result as recorded in the aggregate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OrderingStatus {
    Success,
    Rejected { status_code: String },
    Unreachable { cause: String },
}

impl OrderingStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, OrderingStatus::Success)
    }
}

// =============================================================================
// COMMIT
// =============================================================================

/// "Transaction X reached status Y at height Z" as reported by one peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitNotification {
    pub peer: PeerId,
    pub transaction_id: TransactionId,
    pub validation_code: String,
    pub block_height: u64,
}

/// How one peer's commit watch resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PeerCommitStatus {
    Valid { block_height: u64 },
    Invalid { validation_code: String, block_height: u64 },
    Timeout,
    TransportError { cause: String },
}

impl PeerCommitStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, PeerCommitStatus::Valid { .. })
    }
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// Final result of one submit-and-confirm lifecycle.
///
/// Only built once the ordering outcome and every watch have resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregatedOutcome {
    pub transaction_id: TransactionId,
    pub overall_success: bool,
    pub ordering_status: OrderingStatus,
    pub per_peer_commit_status: BTreeMap<PeerId, PeerCommitStatus>,
    pub first_error_message: Option<String>,
    /// Payload of the first endorsement, i.e. the chaincode's return value.
    pub payload: Vec<u8>,
}

impl AggregatedOutcome {
    pub fn valid_commits(&self) -> usize {
        self.per_peer_commit_status
            .values()
            .filter(|status| status.is_valid())
            .count()
    }
}

/// Result of an evaluation (query).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryOutcome {
    pub transaction_id: TransactionId,
    pub payload: Vec<u8>,
}
