//! Proposal Coordinator - submit-and-confirm lifecycle
//!
//! One `submit` call resolves the signer and the channel, fans the proposal
//! out to every endorser, checks the endorsement policy and, when it passes,
//! arms one commit watch per peer *before* handing the transaction to the
//! ordering service. It returns only after the ordering answer and every
//! watch have resolved. The channel context is closed on every exit path.

use crate::application::commit_watch::CommitWatch;
use crate::application::stats::{CoordinatorStats, StatsSnapshot};
use crate::config::CoordinatorConfig;
use crate::domain::aggregation::aggregate;
use crate::domain::entities::{
    AggregatedOutcome, EndorsementResponse, EvaluateRequest, OrderingStatus, OrderingSubmission,
    ProposalRequest, QueryOutcome, SubmitRequest,
};
use crate::domain::errors::CoordinatorError;
use crate::domain::policy::{evaluate_endorsements, first_payload};
use crate::ports::inbound::TransactionSubmissionApi;
use crate::ports::outbound::{ChannelContext, LedgerClient};
use async_trait::async_trait;
use futures::future::join_all;
use shared_types::{IdentityKey, IdentityProvider, TransactionId};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Drives proposals through endorsement, ordering and commit confirmation.
pub struct ProposalCoordinator {
    config: CoordinatorConfig,
    ledger: Arc<dyn LedgerClient>,
    identities: Arc<dyn IdentityProvider>,
    stats: Arc<CoordinatorStats>,
}

impl ProposalCoordinator {
    pub fn new(ledger: Arc<dyn LedgerClient>, identities: Arc<dyn IdentityProvider>) -> Self {
        Self::with_config(CoordinatorConfig::default(), ledger, identities)
    }

    pub fn with_config(
        config: CoordinatorConfig,
        ledger: Arc<dyn LedgerClient>,
        identities: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            config,
            ledger,
            identities,
            stats: Arc::new(CoordinatorStats::default()),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Resolve signer credentials, then the channel. No network call is made
    /// for an unknown identity.
    async fn open(
        &self,
        signer: &IdentityKey,
        channel: &str,
    ) -> Result<ContextGuard, CoordinatorError> {
        let credentials = self.identities.resolve(signer).await.map_err(|err| {
            warn!(identity = %signer, error = %err, "signer could not be resolved");
            CoordinatorError::from(err)
        })?;
        debug!(identity = %signer, msp = %credentials.msp_id.0, "signer resolved");

        let context = self.ledger.resolve_context(&credentials, channel).await?;
        debug!(channel = %channel, session = context.session, "channel context resolved");
        Ok(ContextGuard {
            ledger: Arc::clone(&self.ledger),
            context,
            closed: false,
        })
    }

    /// Endorse `proposal` on every peer and enforce the endorsement policy.
    async fn endorse(
        &self,
        context: &ChannelContext,
        proposal: &ProposalRequest,
    ) -> Result<Vec<EndorsementResponse>, CoordinatorError> {
        let responses = self
            .ledger
            .send_proposal(context, proposal, self.config.proposal_timeout)
            .await?;
        debug!(
            tx_id = %proposal.transaction_id,
            responses = responses.len(),
            "endorsement responses received"
        );

        let verdict = evaluate_endorsements(&responses, self.config.endorsement_success_status);
        if !verdict.all_good {
            error!(
                tx_id = %proposal.transaction_id,
                rejected = verdict.causes.len(),
                "failed to send proposal or receive valid response"
            );
            return Err(CoordinatorError::EndorsementRejected {
                causes: verdict.causes,
            });
        }
        info!(tx_id = %proposal.transaction_id, "successfully sent proposal and received response");
        Ok(responses)
    }

    async fn order(&self, context: &ChannelContext, submission: OrderingSubmission) -> OrderingStatus {
        let tx_id = submission.transaction_id.clone();
        match self.ledger.send_to_ordering(context, submission).await {
            Ok(outcome) if outcome.status == self.config.ordering_success_status => {
                info!(tx_id = %tx_id, "successfully sent transaction to the orderer");
                OrderingStatus::Success
            }
            Ok(outcome) => {
                error!(tx_id = %tx_id, status = %outcome.status, "failed to order the transaction");
                OrderingStatus::Rejected {
                    status_code: outcome.status,
                }
            }
            Err(err) => {
                error!(tx_id = %tx_id, error = %err, "ordering service unreachable");
                OrderingStatus::Unreachable {
                    cause: err.to_string(),
                }
            }
        }
    }

    /// Steps after the context is open. Kept apart so `submit` can always
    /// close the context, whatever this returns.
    async fn run_submission(
        &self,
        context: &ChannelContext,
        request: SubmitRequest,
    ) -> Result<AggregatedOutcome, CoordinatorError> {
        let transaction_id = self.ledger.new_transaction_id(&context.signer);
        let proposal = ProposalRequest {
            chaincode: request.chaincode,
            version: request.version,
            function: request.function,
            args: request.args,
            transaction_id: transaction_id.clone(),
        };
        info!(
            tx_id = %transaction_id,
            chaincode = %proposal.chaincode,
            function = %proposal.function,
            upgrade = proposal.is_upgrade(),
            "sending transaction proposal"
        );

        let endorsements = self.endorse(context, &proposal).await?;
        let payload = first_payload(&endorsements).map(<[u8]>::to_vec).unwrap_or_default();

        let commit_timeout = request.commit_timeout.unwrap_or(self.config.commit_timeout);
        let watches = self.arm_watches(context, &transaction_id, commit_timeout).await;

        let submission = OrderingSubmission {
            transaction_id: transaction_id.clone(),
            endorsements,
            proposal,
        };
        let (ordering_status, peer_statuses) = tokio::join!(
            self.order(context, submission),
            join_all(watches.into_iter().map(CommitWatch::resolve)),
        );

        let outcome = aggregate(
            transaction_id,
            ordering_status,
            peer_statuses,
            self.config.commit_policy,
            payload,
        );
        if outcome.overall_success {
            info!(
                tx_id = %outcome.transaction_id,
                valid = outcome.valid_commits(),
                "transaction committed"
            );
        } else {
            error!(
                tx_id = %outcome.transaction_id,
                error = outcome.first_error_message.as_deref().unwrap_or_default(),
                "transaction did not commit"
            );
        }
        Ok(outcome)
    }

    /// Register and connect one watch per distinct peer.
    async fn arm_watches(
        &self,
        context: &ChannelContext,
        transaction_id: &TransactionId,
        timeout: Duration,
    ) -> Vec<CommitWatch> {
        let mut seen = HashSet::new();
        let mut watches = Vec::new();
        for watcher in self.ledger.event_watchers(context) {
            if !seen.insert(watcher.peer_id().clone()) {
                continue;
            }
            watches.push(
                CommitWatch::register(watcher, transaction_id, timeout, &self.config.valid_code)
                    .await,
            );
        }
        debug!(tx_id = %transaction_id, watches = watches.len(), "commit watches armed");
        watches
    }

    async fn run_evaluation(
        &self,
        context: &ChannelContext,
        request: EvaluateRequest,
    ) -> Result<QueryOutcome, CoordinatorError> {
        let transaction_id = self.ledger.new_transaction_id(&context.signer);
        let proposal = ProposalRequest {
            chaincode: request.chaincode,
            version: None,
            function: request.function,
            args: request.args,
            transaction_id: transaction_id.clone(),
        };

        let responses = self.endorse(context, &proposal).await?;
        let payload = first_payload(&responses)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| CoordinatorError::EndorsementRejected {
                causes: vec!["no endorsement responses received".to_string()],
            })?;

        Ok(QueryOutcome {
            transaction_id,
            payload,
        })
    }
}

/// An open channel context, closed exactly once.
///
/// `close` is the normal path. A guard dropped without it (the caller's
/// future was cancelled or panicked) hands the close to a spawned task.
struct ContextGuard {
    ledger: Arc<dyn LedgerClient>,
    context: ChannelContext,
    closed: bool,
}

impl ContextGuard {
    async fn close(mut self) {
        self.closed = true;
        close_context(self.ledger.as_ref(), self.context.clone()).await;
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let session = self.context.session;
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(session, "no runtime left to close abandoned channel context");
            return;
        };
        warn!(session, "transaction abandoned, closing channel context");
        let ledger = Arc::clone(&self.ledger);
        let context = self.context.clone();
        runtime.spawn(async move {
            close_context(ledger.as_ref(), context).await;
        });
    }
}

async fn close_context(ledger: &dyn LedgerClient, context: ChannelContext) {
    let session = context.session;
    if let Err(err) = ledger.close_context(context).await {
        warn!(session, error = %err, "failed to close channel context");
    }
}

#[async_trait]
impl TransactionSubmissionApi for ProposalCoordinator {
    #[instrument(skip(self, request), fields(signer = %request.signer, channel = %request.channel))]
    async fn submit(&self, request: SubmitRequest) -> Result<AggregatedOutcome, CoordinatorError> {
        self.stats.record_submitted();

        let result = match self.open(&request.signer, &request.channel).await {
            Ok(guard) => {
                let result = self.run_submission(&guard.context, request).await;
                guard.close().await;
                result
            }
            Err(err) => Err(err),
        };

        match &result {
            Ok(outcome) => self.stats.record_outcome(outcome),
            Err(err) => self.stats.record_error(err),
        }
        result
    }

    #[instrument(skip(self, request), fields(signer = %request.signer, channel = %request.channel))]
    async fn evaluate(&self, request: EvaluateRequest) -> Result<QueryOutcome, CoordinatorError> {
        self.stats.record_evaluation();

        let guard = self.open(&request.signer, &request.channel).await?;
        let result = self.run_evaluation(&guard.context, request).await;
        guard.close().await;
        result
    }

    fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}
