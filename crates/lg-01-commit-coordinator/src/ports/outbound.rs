//! Outbound Ports (Driven Ports / SPI)
//!
//! The ledger platform is an external collaborator. These traits describe the
//! slice of it the coordinator drives: channel contexts, proposal fan-out,
//! ordering submission and per-peer commit-event sources.

use crate::domain::entities::{
    CommitNotification, EndorsementResponse, OrderingOutcome, OrderingSubmission, ProposalRequest,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{ChannelName, Credentials, LedgerError, PeerId, TransactionId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// Handle to a resolved channel, bound to the identity that resolved it.
///
/// Must be handed back to `LedgerClient::close_context` exactly once.
#[derive(Clone, Debug)]
pub struct ChannelContext {
    pub channel: ChannelName,
    pub signer: Credentials,
    /// Adapter-assigned session number.
    pub session: u64,
}

/// Ledger client
///
/// Proposal fan-out and ordering submission for one network.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Resolve `channel` for `signer`.
    ///
    /// Fails with `LedgerError::ChannelNotFound` when the channel is not
    /// declared in the network configuration.
    async fn resolve_context(
        &self,
        signer: &Credentials,
        channel: &str,
    ) -> Result<ChannelContext, LedgerError>;

    /// Allocate a transaction id bound to `signer`.
    fn new_transaction_id(&self, signer: &Credentials) -> TransactionId {
        TransactionId::generate(signer)
    }

    /// Send `request` to every endorser of the channel.
    ///
    /// Returns once every endorser answered or errored; per-peer failures are
    /// carried inside the returned responses.
    async fn send_proposal(
        &self,
        context: &ChannelContext,
        request: &ProposalRequest,
        timeout: Duration,
    ) -> Result<Vec<EndorsementResponse>, LedgerError>;

    /// Event sources of the channel, one per peer.
    fn event_watchers(&self, context: &ChannelContext) -> Vec<Arc<dyn EventWatcher>>;

    /// Submit the endorsed transaction to the ordering service.
    async fn send_to_ordering(
        &self,
        context: &ChannelContext,
        submission: OrderingSubmission,
    ) -> Result<OrderingOutcome, LedgerError>;

    /// Release the channel handle.
    async fn close_context(&self, context: ChannelContext) -> Result<(), LedgerError>;
}

/// Options for a commit watch registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatchOptions {
    /// Drop the registration after the first event.
    pub unregister_after_first_event: bool,
    /// Disconnect the event source once the watch resolved.
    pub disconnect_on_resolve: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            unregister_after_first_event: true,
            disconnect_on_resolve: true,
        }
    }
}

/// Per-peer commit event source.
#[async_trait]
pub trait EventWatcher: Send + Sync {
    /// Peer this source reports for.
    fn peer_id(&self) -> &PeerId;

    /// Register a watch for `transaction_id`; events are pushed into `sink`.
    fn register_commit_watch(
        &self,
        transaction_id: &TransactionId,
        sink: CommitSink,
        options: WatchOptions,
    ) -> Result<(), LedgerError>;

    async fn connect(&self) -> Result<(), LedgerError>;

    async fn disconnect(&self) -> Result<(), LedgerError>;
}

/// What an event source reports for a watched transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatchSignal {
    Event(CommitNotification),
    Error(String),
}

/// Single-use delivery slot handed to an event source.
///
/// The first `on_event`/`on_error` call resolves the watch; every later call
/// returns `false` and is dropped. Clones share the slot.
#[derive(Clone, Debug)]
pub struct CommitSink {
    peer: PeerId,
    transaction_id: TransactionId,
    slot: Arc<Mutex<Option<oneshot::Sender<WatchSignal>>>>,
}

impl CommitSink {
    pub fn new(
        peer: PeerId,
        transaction_id: TransactionId,
    ) -> (Self, oneshot::Receiver<WatchSignal>) {
        let (tx, rx) = oneshot::channel();
        let sink = Self {
            peer,
            transaction_id,
            slot: Arc::new(Mutex::new(Some(tx))),
        };
        (sink, rx)
    }

    pub fn peer(&self) -> &PeerId {
        &self.peer
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    /// Deliver a commit notification. Notifications for another transaction
    /// are ignored.
    pub fn on_event(&self, notification: CommitNotification) -> bool {
        if notification.transaction_id != self.transaction_id {
            return false;
        }
        self.deliver(WatchSignal::Event(notification))
    }

    /// Deliver a terminal error from the event source.
    pub fn on_error(&self, cause: impl Into<String>) -> bool {
        self.deliver(WatchSignal::Error(cause.into()))
    }

    /// Whether the watch already resolved (or was closed).
    pub fn is_resolved(&self) -> bool {
        self.slot.lock().is_none()
    }

    /// Close the slot without delivering anything.
    pub fn close(&self) {
        self.slot.lock().take();
    }

    fn deliver(&self, signal: WatchSignal) -> bool {
        let Some(sender) = self.slot.lock().take() else {
            return false;
        };
        sender.send(signal).is_ok()
    }
}
