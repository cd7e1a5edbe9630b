//! Outcome aggregation.
//!
//! Folds the ordering status and every peer's commit status into a single
//! `AggregatedOutcome`. Pure: callers hand in fully resolved inputs only.

use crate::config::CommitPolicy;
use crate::domain::entities::{AggregatedOutcome, OrderingStatus, PeerCommitStatus};
use crate::domain::errors::CoordinatorError;
use shared_types::{PeerId, TransactionId};
use std::collections::BTreeMap;

/// Name used for the ordering service in transport errors.
pub const ORDERER: &str = "orderer";

/// Build the final outcome for one transaction.
pub fn aggregate(
    transaction_id: TransactionId,
    ordering_status: OrderingStatus,
    peer_statuses: Vec<(PeerId, PeerCommitStatus)>,
    policy: CommitPolicy,
    payload: Vec<u8>,
) -> AggregatedOutcome {
    let per_peer_commit_status: BTreeMap<PeerId, PeerCommitStatus> =
        peer_statuses.into_iter().collect();

    let watched = per_peer_commit_status.len();
    let valid = per_peer_commit_status
        .values()
        .filter(|status| status.is_valid())
        .count();

    let overall_success = ordering_status.is_success() && policy.is_satisfied(valid, watched);

    let first_error_message = ordering_error(&ordering_status)
        .or_else(|| {
            per_peer_commit_status
                .iter()
                .find_map(|(peer, status)| commit_error(peer, status))
        })
        .map(|err| err.to_string());

    AggregatedOutcome {
        transaction_id,
        overall_success,
        ordering_status,
        per_peer_commit_status,
        first_error_message,
        payload,
    }
}

impl AggregatedOutcome {
    /// The taxonomy member explaining why `overall_success` is false.
    ///
    /// Ordering failures take precedence over commit failures.
    pub fn error(&self) -> Option<CoordinatorError> {
        if self.overall_success {
            return None;
        }
        ordering_error(&self.ordering_status).or_else(|| {
            self.per_peer_commit_status
                .iter()
                .find_map(|(peer, status)| commit_error(peer, status))
        })
    }

    /// `Ok(self)` when the transaction succeeded, the primary error otherwise.
    pub fn into_result(self) -> Result<AggregatedOutcome, CoordinatorError> {
        match self.error() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

fn ordering_error(status: &OrderingStatus) -> Option<CoordinatorError> {
    match status {
        OrderingStatus::Success => None,
        OrderingStatus::Rejected { status_code } => Some(CoordinatorError::OrderingFailed {
            status_code: status_code.clone(),
        }),
        OrderingStatus::Unreachable { cause } => Some(CoordinatorError::TransportError {
            peer_id: PeerId::new(ORDERER),
            cause: cause.clone(),
        }),
    }
}

fn commit_error(peer: &PeerId, status: &PeerCommitStatus) -> Option<CoordinatorError> {
    match status {
        PeerCommitStatus::Valid { .. } => None,
        PeerCommitStatus::Invalid {
            validation_code, ..
        } => Some(CoordinatorError::CommitInvalid {
            peer_id: peer.clone(),
            validation_code: validation_code.clone(),
        }),
        PeerCommitStatus::Timeout => Some(CoordinatorError::CommitTimeout {
            peer_id: peer.clone(),
        }),
        PeerCommitStatus::TransportError { cause } => Some(CoordinatorError::TransportError {
            peer_id: peer.clone(),
            cause: cause.clone(),
        }),
    }
}
