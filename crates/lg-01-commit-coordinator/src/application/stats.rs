//! Coordinator statistics.

use crate::domain::entities::{AggregatedOutcome, PeerCommitStatus};
use crate::domain::errors::CoordinatorError;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lifetime counters for one coordinator instance.
#[derive(Debug, Default)]
pub struct CoordinatorStats {
    /// Submissions started
    pub submitted: AtomicU64,
    /// Submissions whose aggregate reported overall success
    pub committed: AtomicU64,
    /// Submissions that returned an error instead of an outcome
    pub failed: AtomicU64,
    /// Submissions stopped at the endorsement policy
    pub endorsement_rejections: AtomicU64,
    /// Submissions the ordering service refused or never answered
    pub ordering_failures: AtomicU64,
    /// Peer watches that timed out
    pub commit_timeouts: AtomicU64,
    /// Peer watches that reported a non-valid code
    pub commit_invalid: AtomicU64,
    /// Evaluations (queries) served
    pub evaluations: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub submitted: u64,
    pub committed: u64,
    pub failed: u64,
    pub endorsement_rejections: u64,
    pub ordering_failures: u64,
    pub commit_timeouts: u64,
    pub commit_invalid: u64,
    pub evaluations: u64,
}

impl CoordinatorStats {
    pub fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evaluation(&self) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_outcome(&self, outcome: &AggregatedOutcome) {
        if outcome.overall_success {
            self.committed.fetch_add(1, Ordering::Relaxed);
        }
        if !outcome.ordering_status.is_success() {
            self.ordering_failures.fetch_add(1, Ordering::Relaxed);
        }
        for status in outcome.per_peer_commit_status.values() {
            match status {
                PeerCommitStatus::Timeout => {
                    self.commit_timeouts.fetch_add(1, Ordering::Relaxed);
                }
                PeerCommitStatus::Invalid { .. } => {
                    self.commit_invalid.fetch_add(1, Ordering::Relaxed);
                }
                PeerCommitStatus::Valid { .. } | PeerCommitStatus::TransportError { .. } => {}
            }
        }
    }

    pub fn record_error(&self, err: &CoordinatorError) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        if matches!(err, CoordinatorError::EndorsementRejected { .. }) {
            self.endorsement_rejections.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            endorsement_rejections: self.endorsement_rejections.load(Ordering::Relaxed),
            ordering_failures: self.ordering_failures.load(Ordering::Relaxed),
            commit_timeouts: self.commit_timeouts.load(Ordering::Relaxed),
            commit_invalid: self.commit_invalid.load(Ordering::Relaxed),
            evaluations: self.evaluations.load(Ordering::Relaxed),
        }
    }
}
