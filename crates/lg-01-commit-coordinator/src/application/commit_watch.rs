//! One-shot commit watch for a single peer.
//!
//! Wraps the callback-style `EventWatcher` registration into a future that
//! resolves exactly once: valid, invalid, transport error or timeout. The
//! `CommitSink` slot is single-use, so late or duplicate events are dropped
//! without extra bookkeeping.

use crate::domain::entities::{CommitNotification, PeerCommitStatus};
use crate::ports::outbound::{CommitSink, EventWatcher, WatchOptions, WatchSignal};
use shared_types::{PeerId, TransactionId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

enum WatchState {
    Armed(oneshot::Receiver<WatchSignal>),
    Failed(String),
}

/// Connected watcher that still owes a disconnect.
///
/// Dropped while armed (the transaction was abandoned before the watch
/// resolved), it closes the sink and disconnects from a spawned task.
struct Connection {
    peer: PeerId,
    sink: CommitSink,
    watcher: Option<Arc<dyn EventWatcher>>,
}

impl Connection {
    /// The event source disconnects itself once it reported.
    fn disarm(&mut self) {
        self.watcher = None;
    }

    async fn disconnect(&mut self) {
        self.sink.close();
        if let Some(watcher) = self.watcher.take() {
            disconnect(&self.peer, watcher.as_ref()).await;
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let Some(watcher) = self.watcher.take() else {
            return;
        };
        self.sink.close();
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(peer = %self.peer, "no runtime left to disconnect abandoned watch");
            return;
        };
        debug!(peer = %self.peer, "disconnecting abandoned commit watch");
        let peer = self.peer.clone();
        runtime.spawn(async move {
            disconnect(&peer, watcher.as_ref()).await;
        });
    }
}

async fn disconnect(peer: &PeerId, watcher: &dyn EventWatcher) {
    if let Err(err) = watcher.disconnect().await {
        warn!(peer = %peer, error = %err, "failed to disconnect commit watch");
    }
}

/// A registered (or failed-to-register) commit watch.
pub struct CommitWatch {
    connection: Connection,
    state: WatchState,
    timeout: Duration,
    valid_code: String,
}

impl CommitWatch {
    /// Register a watch for `transaction_id` on `watcher` and connect it.
    ///
    /// A registration or connect failure does not abort the transaction: the
    /// watch is returned already failed and resolves as a transport error.
    pub async fn register(
        watcher: Arc<dyn EventWatcher>,
        transaction_id: &TransactionId,
        timeout: Duration,
        valid_code: &str,
    ) -> Self {
        let peer = watcher.peer_id().clone();
        let (sink, receiver) = CommitSink::new(peer.clone(), transaction_id.clone());

        let armed = match watcher.register_commit_watch(
            transaction_id,
            sink.clone(),
            WatchOptions::default(),
        ) {
            Ok(()) => watcher.connect().await,
            Err(err) => Err(err),
        };

        let (state, watcher) = match armed {
            Ok(()) => {
                debug!(peer = %peer, tx_id = %transaction_id, "commit watch registered");
                (WatchState::Armed(receiver), Some(watcher))
            }
            Err(err) => {
                warn!(peer = %peer, tx_id = %transaction_id, error = %err, "commit watch registration failed");
                sink.close();
                (WatchState::Failed(err.to_string()), None)
            }
        };

        Self {
            connection: Connection {
                peer,
                sink,
                watcher,
            },
            state,
            timeout,
            valid_code: valid_code.to_string(),
        }
    }

    pub fn peer(&self) -> &PeerId {
        &self.connection.peer
    }

    /// Wait for the first signal or the timeout, whichever comes first.
    pub async fn resolve(self) -> (PeerId, PeerCommitStatus) {
        let CommitWatch {
            mut connection,
            state,
            timeout,
            valid_code,
        } = self;
        let peer = connection.peer.clone();

        let status = match state {
            WatchState::Failed(cause) => PeerCommitStatus::TransportError { cause },
            WatchState::Armed(receiver) => match tokio::time::timeout(timeout, receiver).await {
                Ok(Ok(WatchSignal::Event(notification))) => {
                    connection.disarm();
                    classify(&peer, notification, &valid_code)
                }
                Ok(Ok(WatchSignal::Error(cause))) => {
                    connection.disarm();
                    error!(peer = %peer, cause = %cause, "commit event source reported an error");
                    PeerCommitStatus::TransportError { cause }
                }
                Ok(Err(_)) => {
                    connection.disarm();
                    error!(peer = %peer, "commit event source dropped the watch");
                    PeerCommitStatus::TransportError {
                        cause: "event source closed before reporting".to_string(),
                    }
                }
                Err(_) => {
                    error!(
                        peer = %peer,
                        timeout_ms = timeout.as_millis() as u64,
                        "REQUEST_TIMEOUT: no commit event"
                    );
                    connection.disconnect().await;
                    PeerCommitStatus::Timeout
                }
            },
        };

        (peer, status)
    }
}

fn classify(peer: &PeerId, notification: CommitNotification, valid_code: &str) -> PeerCommitStatus {
    info!(
        peer = %peer,
        tx_id = %notification.transaction_id,
        code = %notification.validation_code,
        block = notification.block_height,
        "transaction committed on peer"
    );
    if notification.validation_code == valid_code {
        PeerCommitStatus::Valid {
            block_height: notification.block_height,
        }
    } else {
        error!(
            peer = %peer,
            code = %notification.validation_code,
            "transaction was invalid"
        );
        PeerCommitStatus::Invalid {
            validation_code: notification.validation_code,
            block_height: notification.block_height,
        }
    }
}
