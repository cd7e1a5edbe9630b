//! Inbound Ports (Driving Ports / API)

use crate::application::stats::StatsSnapshot;
use crate::domain::entities::{AggregatedOutcome, EvaluateRequest, QueryOutcome, SubmitRequest};
use crate::domain::errors::CoordinatorError;
use async_trait::async_trait;

/// Primary transaction submission API
#[async_trait]
pub trait TransactionSubmissionApi: Send + Sync {
    /// Submit a state-changing operation and wait for ledger-level commit.
    ///
    /// This is the main entry point. It:
    /// 1. Resolves the signer and the channel
    /// 2. Collects endorsements from every endorser
    /// 3. Watches every peer for the commit event
    /// 4. Submits to ordering once
    /// 5. Aggregates all N + 1 signals
    ///
    /// Returns `Err` for failures before ordering (identity, channel,
    /// endorsement). Ordering and commit failures are reported inside the
    /// outcome; see `AggregatedOutcome::error`.
    async fn submit(&self, request: SubmitRequest) -> Result<AggregatedOutcome, CoordinatorError>;

    /// Evaluate a read-only call: endorse only, never order.
    async fn evaluate(&self, request: EvaluateRequest) -> Result<QueryOutcome, CoordinatorError>;

    /// Lifetime counters of this coordinator.
    fn stats(&self) -> StatsSnapshot;
}
