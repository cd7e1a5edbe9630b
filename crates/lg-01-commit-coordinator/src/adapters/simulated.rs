//! Simulated ledger network.
//!
//! A scriptable, in-process stand-in for the ledger platform. Each peer gets
//! an endorsement behaviour and a commit behaviour; the ordering service gets
//! one behaviour for the whole network. Every collaborator call is appended to
//! a `CallJournal` so tests can assert on call counts and call order.
//!
//! Event watchers are created per channel context, so concurrent transactions
//! never share (or disconnect) each other's watches.

use crate::domain::entities::{
    CommitNotification, EndorsementResponse, OrderingOutcome, OrderingSubmission, ProposalRequest,
    ProposalResponse,
};
use crate::ports::outbound::{ChannelContext, CommitSink, EventWatcher, LedgerClient, WatchOptions};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Credentials, LedgerError, PeerId, TransactionId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::{ENDORSEMENT_OK, ORDERING_SUCCESS, VALID_CODE};
use crate::domain::aggregation::ORDERER;

// =============================================================================
// BEHAVIOURS
// =============================================================================

/// How a peer answers a proposal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EndorsementBehavior {
    /// Status 200 with this payload.
    Endorse { payload: Vec<u8> },
    /// A structured response with a non-success status.
    Status { status: u32, message: String },
    /// An error value instead of a response.
    Fail(String),
}

impl EndorsementBehavior {
    pub fn endorse(payload: impl Into<Vec<u8>>) -> Self {
        Self::Endorse {
            payload: payload.into(),
        }
    }

    pub fn status(status: u32, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }
}

/// How a peer reports the commit of an ordered transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitBehavior {
    Valid,
    Invalid(String),
    /// Never reports.
    Silent,
    /// Reports a terminal error.
    Error(String),
    /// Reports `VALID` after the delay.
    Delayed(Duration),
    /// Reports `VALID`, then repeats itself and finally reports an invalid code.
    Duplicate,
}

/// How the ordering service answers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderingBehavior {
    Accept,
    Reject(String),
    Unreachable(String),
}

// =============================================================================
// CALL JOURNAL
// =============================================================================

/// One recorded collaborator call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerCall {
    ResolveContext { channel: String },
    SendProposal { transaction_id: TransactionId },
    RegisterWatch { peer: PeerId },
    Connect { peer: PeerId },
    SendToOrdering { transaction_id: TransactionId },
    Disconnect { peer: PeerId },
    CloseContext { session: u64 },
}

/// Ordered log of collaborator calls.
#[derive(Debug, Default)]
pub struct CallJournal {
    calls: Mutex<Vec<LedgerCall>>,
}

impl CallJournal {
    pub fn record(&self, call: LedgerCall) {
        self.calls.lock().push(call);
    }

    pub fn calls(&self) -> Vec<LedgerCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&LedgerCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(call)).count()
    }

    pub fn position(&self, predicate: impl Fn(&LedgerCall) -> bool) -> Option<usize> {
        self.calls.lock().iter().position(|call| predicate(call))
    }
}

// =============================================================================
// PEERS AND EVENT WATCHERS
// =============================================================================

#[derive(Debug)]
struct PeerScript {
    id: PeerId,
    endorsement: Mutex<EndorsementBehavior>,
    commit: Mutex<CommitBehavior>,
}

/// Event source for one peer within one channel context.
pub struct SimulatedEventWatcher {
    script: Arc<PeerScript>,
    watches: Mutex<HashMap<TransactionId, (CommitSink, WatchOptions)>>,
    connected: AtomicBool,
    journal: Arc<CallJournal>,
}

impl SimulatedEventWatcher {
    fn new(script: Arc<PeerScript>, journal: Arc<CallJournal>) -> Self {
        Self {
            script,
            watches: Mutex::new(HashMap::new()),
            connected: AtomicBool::new(false),
            journal,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn pending_watches(&self) -> usize {
        self.watches.lock().len()
    }

    /// Report the commit of `transaction_id` at `block_height` according to
    /// the peer's commit behaviour.
    fn commit(&self, transaction_id: &TransactionId, block_height: u64) {
        let behavior = self.script.commit.lock().clone();
        if behavior == CommitBehavior::Silent {
            debug!(peer = %self.script.id, "simulated peer stays silent");
            return;
        }

        let registration = {
            let mut watches = self.watches.lock();
            match watches.get(transaction_id) {
                Some((_, options)) if options.unregister_after_first_event => {
                    watches.remove(transaction_id)
                }
                Some((sink, options)) => Some((sink.clone(), *options)),
                None => None,
            }
        };
        let Some((sink, options)) = registration else {
            return;
        };

        let notification = |code: &str| CommitNotification {
            peer: self.script.id.clone(),
            transaction_id: transaction_id.clone(),
            validation_code: code.to_string(),
            block_height,
        };

        match behavior {
            CommitBehavior::Valid => {
                sink.on_event(notification(VALID_CODE));
            }
            CommitBehavior::Invalid(code) => {
                sink.on_event(notification(&code));
            }
            CommitBehavior::Error(cause) => {
                sink.on_error(cause);
            }
            CommitBehavior::Duplicate => {
                sink.on_event(notification(VALID_CODE));
                sink.on_event(notification(VALID_CODE));
                sink.on_event(notification("MVCC_READ_CONFLICT"));
            }
            CommitBehavior::Delayed(delay) => {
                let late = notification(VALID_CODE);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    sink.on_event(late);
                });
            }
            CommitBehavior::Silent => {}
        }

        if options.disconnect_on_resolve {
            self.connected.store(false, Ordering::SeqCst);
            self.journal.record(LedgerCall::Disconnect {
                peer: self.script.id.clone(),
            });
        }
    }
}

#[async_trait]
impl EventWatcher for SimulatedEventWatcher {
    fn peer_id(&self) -> &PeerId {
        &self.script.id
    }

    fn register_commit_watch(
        &self,
        transaction_id: &TransactionId,
        sink: CommitSink,
        options: WatchOptions,
    ) -> Result<(), LedgerError> {
        self.journal.record(LedgerCall::RegisterWatch {
            peer: self.script.id.clone(),
        });
        self.watches
            .lock()
            .insert(transaction_id.clone(), (sink, options));
        Ok(())
    }

    async fn connect(&self) -> Result<(), LedgerError> {
        self.journal.record(LedgerCall::Connect {
            peer: self.script.id.clone(),
        });
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), LedgerError> {
        self.journal.record(LedgerCall::Disconnect {
            peer: self.script.id.clone(),
        });
        self.connected.store(false, Ordering::SeqCst);
        self.watches.lock().clear();
        Ok(())
    }
}

// =============================================================================
// LEDGER
// =============================================================================

/// Builder for `SimulatedLedger`.
#[derive(Default)]
pub struct SimulatedLedgerBuilder {
    channels: HashSet<String>,
    peers: Vec<(PeerId, EndorsementBehavior, CommitBehavior)>,
    ordering: Option<OrderingBehavior>,
}

impl SimulatedLedgerBuilder {
    pub fn channel(mut self, name: &str) -> Self {
        self.channels.insert(name.to_string());
        self
    }

    /// A well-behaved peer: endorses with an empty JSON object and commits valid.
    pub fn peer(self, id: &str) -> Self {
        self.peer_with(id, EndorsementBehavior::endorse(b"{}".to_vec()), CommitBehavior::Valid)
    }

    pub fn peer_with(mut self, id: &str, endorsement: EndorsementBehavior, commit: CommitBehavior) -> Self {
        self.peers.push((PeerId::new(id), endorsement, commit));
        self
    }

    pub fn ordering(mut self, behavior: OrderingBehavior) -> Self {
        self.ordering = Some(behavior);
        self
    }

    pub fn build(self) -> SimulatedLedger {
        let peers = self
            .peers
            .into_iter()
            .map(|(id, endorsement, commit)| {
                Arc::new(PeerScript {
                    id,
                    endorsement: Mutex::new(endorsement),
                    commit: Mutex::new(commit),
                })
            })
            .collect();

        SimulatedLedger {
            channels: self.channels,
            peers,
            ordering: Mutex::new(self.ordering.unwrap_or(OrderingBehavior::Accept)),
            journal: Arc::new(CallJournal::default()),
            next_session: AtomicU64::new(1),
            block_height: AtomicU64::new(0),
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

/// In-process ledger network.
pub struct SimulatedLedger {
    channels: HashSet<String>,
    peers: Vec<Arc<PeerScript>>,
    ordering: Mutex<OrderingBehavior>,
    journal: Arc<CallJournal>,
    next_session: AtomicU64,
    block_height: AtomicU64,
    /// Open sessions and the event watchers created for them.
    sessions: Mutex<HashMap<u64, Vec<Arc<SimulatedEventWatcher>>>>,
}

impl SimulatedLedger {
    pub fn builder() -> SimulatedLedgerBuilder {
        SimulatedLedgerBuilder::default()
    }

    pub fn journal(&self) -> &CallJournal {
        &self.journal
    }

    /// Contexts resolved but not yet closed.
    pub fn open_sessions(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn block_height(&self) -> u64 {
        self.block_height.load(Ordering::SeqCst)
    }

    pub fn set_endorsement(&self, peer: &str, behavior: EndorsementBehavior) {
        if let Some(script) = self.script(peer) {
            *script.endorsement.lock() = behavior;
        }
    }

    pub fn set_commit(&self, peer: &str, behavior: CommitBehavior) {
        if let Some(script) = self.script(peer) {
            *script.commit.lock() = behavior;
        }
    }

    pub fn set_ordering(&self, behavior: OrderingBehavior) {
        *self.ordering.lock() = behavior;
    }

    fn script(&self, peer: &str) -> Option<&Arc<PeerScript>> {
        self.peers.iter().find(|script| script.id.as_str() == peer)
    }

    fn endorse(script: &PeerScript, request: &ProposalRequest) -> EndorsementResponse {
        let behavior = script.endorsement.lock().clone();
        match behavior {
            EndorsementBehavior::Endorse { payload } => EndorsementResponse::endorsed(
                script.id.clone(),
                ProposalResponse {
                    status: ENDORSEMENT_OK,
                    message: "OK".to_string(),
                    payload,
                    signature: format!("{}:{}", script.id, request.transaction_id).into_bytes(),
                },
            ),
            EndorsementBehavior::Status { status, message } => EndorsementResponse::endorsed(
                script.id.clone(),
                ProposalResponse {
                    status,
                    message,
                    payload: Vec::new(),
                    signature: Vec::new(),
                },
            ),
            EndorsementBehavior::Fail(cause) => {
                EndorsementResponse::failed(script.id.clone(), cause)
            }
        }
    }
}

#[async_trait]
impl LedgerClient for SimulatedLedger {
    async fn resolve_context(
        &self,
        signer: &Credentials,
        channel: &str,
    ) -> Result<ChannelContext, LedgerError> {
        self.journal.record(LedgerCall::ResolveContext {
            channel: channel.to_string(),
        });
        if !self.channels.contains(channel) {
            return Err(LedgerError::ChannelNotFound(channel.to_string()));
        }

        let session = self.next_session.fetch_add(1, Ordering::SeqCst);
        self.sessions.lock().insert(session, Vec::new());

        Ok(ChannelContext {
            channel: channel.to_string(),
            signer: signer.clone(),
            session,
        })
    }

    async fn send_proposal(
        &self,
        _context: &ChannelContext,
        request: &ProposalRequest,
        _timeout: Duration,
    ) -> Result<Vec<EndorsementResponse>, LedgerError> {
        self.journal.record(LedgerCall::SendProposal {
            transaction_id: request.transaction_id.clone(),
        });
        Ok(self
            .peers
            .iter()
            .map(|script| Self::endorse(script, request))
            .collect())
    }

    fn event_watchers(&self, context: &ChannelContext) -> Vec<Arc<dyn EventWatcher>> {
        let mut sessions = self.sessions.lock();
        let watchers = sessions.entry(context.session).or_default();
        if watchers.is_empty() {
            *watchers = self
                .peers
                .iter()
                .map(|script| {
                    Arc::new(SimulatedEventWatcher::new(
                        Arc::clone(script),
                        Arc::clone(&self.journal),
                    ))
                })
                .collect();
        }
        watchers
            .iter()
            .map(|watcher| Arc::clone(watcher) as Arc<dyn EventWatcher>)
            .collect()
    }

    async fn send_to_ordering(
        &self,
        context: &ChannelContext,
        submission: OrderingSubmission,
    ) -> Result<OrderingOutcome, LedgerError> {
        self.journal.record(LedgerCall::SendToOrdering {
            transaction_id: submission.transaction_id.clone(),
        });

        let behavior = self.ordering.lock().clone();
        match behavior {
            OrderingBehavior::Accept => {
                let height = self.block_height.fetch_add(1, Ordering::SeqCst) + 1;
                let watchers = self
                    .sessions
                    .lock()
                    .get(&context.session)
                    .cloned()
                    .unwrap_or_default();
                for watcher in watchers {
                    watcher.commit(&submission.transaction_id, height);
                }
                Ok(OrderingOutcome {
                    status: ORDERING_SUCCESS.to_string(),
                    info: None,
                })
            }
            OrderingBehavior::Reject(status) => Ok(OrderingOutcome { status, info: None }),
            OrderingBehavior::Unreachable(cause) => {
                Err(LedgerError::transport(&PeerId::new(ORDERER), cause))
            }
        }
    }

    async fn close_context(&self, context: ChannelContext) -> Result<(), LedgerError> {
        self.journal.record(LedgerCall::CloseContext {
            session: context.session,
        });
        self.sessions.lock().remove(&context.session);
        Ok(())
    }
}
