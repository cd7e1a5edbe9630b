//! Enrollment admission: one registration attempt per identity at a time.
//!
//! A keyed table of FIFO queues. Each key owns its own queue and wake-up
//! handle; every queue mutation happens under that key's map entry lock, so
//! concurrent callers on the same identity never interleave. Waiters are
//! woken when the head ticket is released or evicted, and re-check on a
//! fallback timer so a crashed holder is still evicted once stale.
//!
//! This serializes callers inside one process only.

use crate::config::AdmissionConfig;
use crate::domain::errors::AdmissionError;
use crate::domain::queue::{AdmissionQueue, AdmissionTicket, TicketId};
use crate::ports::outbound::{SystemTimeSource, TimeSource};
use dashmap::DashMap;
use shared_types::IdentityKey;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, warn};

struct KeyQueue {
    queue: AdmissionQueue,
    notify: Arc<Notify>,
}

impl KeyQueue {
    fn new() -> Self {
        Self {
            queue: AdmissionQueue::new(),
            notify: Arc::new(Notify::new()),
        }
    }
}

enum Turn {
    Admitted,
    Waiting,
    Evicted,
}

/// Per-identity FIFO admission.
pub struct EnrollmentAdmission {
    config: AdmissionConfig,
    time: Arc<dyn TimeSource>,
    queues: DashMap<IdentityKey, KeyQueue>,
}

impl EnrollmentAdmission {
    pub fn new(config: AdmissionConfig) -> Self {
        Self::with_time_source(config, Arc::new(SystemTimeSource))
    }

    pub fn with_time_source(config: AdmissionConfig, time: Arc<dyn TimeSource>) -> Self {
        Self {
            config,
            time,
            queues: DashMap::new(),
        }
    }

    pub fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    /// Append a ticket for `identity`. Never blocks.
    pub fn init(&self, identity: &IdentityKey) -> TicketId {
        let ticket = AdmissionTicket {
            identity: identity.clone(),
            ticket_id: TicketId::new(),
            issued_at: self.time.now(),
        };
        let ticket_id = ticket.ticket_id;

        let mut entry = self
            .queues
            .entry(identity.clone())
            .or_insert_with(KeyQueue::new);
        entry.queue.push(ticket);
        debug!(
            identity = %identity,
            ticket = %ticket_id,
            position = entry.queue.len(),
            "admission ticket issued"
        );
        ticket_id
    }

    /// Is `ticket` at the head of `identity`'s queue?
    ///
    /// Stale tickets ahead of it are evicted. An identity without a queue
    /// admits immediately.
    pub fn acquire(&self, identity: &IdentityKey, ticket: TicketId) -> bool {
        let now = self.time.now();
        let (admitted, drained) = match self.queues.get_mut(identity) {
            Some(mut entry) => {
                let admitted = self.admit_locked(identity, &mut entry, ticket, now);
                (admitted, entry.queue.is_empty())
            }
            None => return true,
        };
        // An unqueued ticket can evict the whole queue.
        if drained {
            self.queues.remove_if(identity, |_, entry| entry.queue.is_empty());
        }
        admitted
    }

    /// Remove `ticket` wherever it sits. Unknown tickets are ignored.
    pub fn release(&self, identity: &IdentityKey, ticket: TicketId) {
        let removed = match self.queues.get_mut(identity) {
            Some(mut entry) => {
                let removed = entry.queue.remove(ticket);
                if removed {
                    entry.notify.notify_waiters();
                }
                removed
            }
            None => false,
        };
        self.queues.remove_if(identity, |_, entry| entry.queue.is_empty());

        if removed {
            debug!(identity = %identity, ticket = %ticket, "admission ticket released");
        }
    }

    /// Suspend until `ticket` reaches the head of the queue.
    ///
    /// Fails when the ticket was evicted as stale while waiting.
    pub async fn wait_for_turn(
        &self,
        identity: &IdentityKey,
        ticket: TicketId,
    ) -> Result<(), AdmissionError> {
        let evicted = || AdmissionError::TicketEvicted {
            identity: identity.clone(),
            ticket,
        };

        loop {
            let notify = match self.queues.get(identity) {
                Some(entry) => Arc::clone(&entry.notify),
                None => return Err(evicted()),
            };
            // Register interest before checking so a release in between is not lost.
            let notified = notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.turn(identity, ticket) {
                Turn::Admitted => {
                    debug!(identity = %identity, ticket = %ticket, "admission granted");
                    return Ok(());
                }
                Turn::Evicted => {
                    warn!(identity = %identity, ticket = %ticket, "admission ticket lost while waiting");
                    return Err(evicted());
                }
                Turn::Waiting => {}
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = tokio::time::sleep(self.config.fallback_wait) => {}
            }
        }
    }

    /// Issue a ticket and wait for it. The returned guard releases the ticket
    /// when dropped, including when the waiting future itself is dropped.
    pub async fn admit(&self, identity: &IdentityKey) -> Result<AdmissionGuard<'_>, AdmissionError> {
        let ticket = self.init(identity);
        let guard = AdmissionGuard {
            admission: self,
            identity: identity.clone(),
            ticket,
        };
        self.wait_for_turn(identity, ticket).await?;
        Ok(guard)
    }

    /// Tickets currently queued for `identity`.
    pub fn pending(&self, identity: &IdentityKey) -> usize {
        self.queues
            .get(identity)
            .map(|entry| entry.queue.len())
            .unwrap_or(0)
    }

    /// Identities with at least one queued ticket.
    pub fn active_identities(&self) -> usize {
        self.queues.len()
    }

    fn turn(&self, identity: &IdentityKey, ticket: TicketId) -> Turn {
        let now = self.time.now();
        let Some(mut entry) = self.queues.get_mut(identity) else {
            return Turn::Evicted;
        };
        if !entry.queue.contains(ticket) {
            return Turn::Evicted;
        }
        if self.admit_locked(identity, &mut entry, ticket, now) {
            Turn::Admitted
        } else {
            Turn::Waiting
        }
    }

    fn admit_locked(
        &self,
        identity: &IdentityKey,
        entry: &mut KeyQueue,
        ticket: TicketId,
        now: Instant,
    ) -> bool {
        let check = entry.queue.admit(ticket, now, self.config.stale_after);
        if !check.evicted.is_empty() {
            warn!(
                identity = %identity,
                evicted = check.evicted.len(),
                "evicted stale admission tickets"
            );
            entry.notify.notify_waiters();
        }
        check.admitted
    }
}

/// Holds the head of an identity's queue until dropped.
pub struct AdmissionGuard<'a> {
    admission: &'a EnrollmentAdmission,
    identity: IdentityKey,
    ticket: TicketId,
}

impl AdmissionGuard<'_> {
    pub fn identity(&self) -> &IdentityKey {
        &self.identity
    }

    pub fn ticket(&self) -> TicketId {
        self.ticket
    }
}

impl Drop for AdmissionGuard<'_> {
    fn drop(&mut self) {
        self.admission.release(&self.identity, self.ticket);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualTimeSource;
    use std::time::Duration;

    fn alice() -> IdentityKey {
        IdentityKey::new("alice")
    }

    fn manual() -> (EnrollmentAdmission, Arc<ManualTimeSource>) {
        let clock = Arc::new(ManualTimeSource::new(Instant::now()));
        let admission = EnrollmentAdmission::with_time_source(
            AdmissionConfig::default(),
            Arc::clone(&clock) as Arc<dyn TimeSource>,
        );
        (admission, clock)
    }

    #[test]
    fn test_unknown_identity_is_admitted() {
        let (admission, _) = manual();
        assert!(admission.acquire(&alice(), TicketId::new()));
    }

    #[test]
    fn test_second_ticket_blocked_until_release() {
        let (admission, _) = manual();
        let t1 = admission.init(&alice());
        let t2 = admission.init(&alice());

        assert!(admission.acquire(&alice(), t1));
        assert!(!admission.acquire(&alice(), t2));

        admission.release(&alice(), t1);
        assert!(admission.acquire(&alice(), t2));
    }

    #[test]
    fn test_stale_head_evicted_after_threshold() {
        let (admission, clock) = manual();
        let t1 = admission.init(&alice());
        let t2 = admission.init(&alice());

        clock.advance(Duration::from_millis(2999));
        assert!(!admission.acquire(&alice(), t2));

        clock.advance(Duration::from_millis(2));
        assert!(admission.acquire(&alice(), t2));
        assert_eq!(admission.pending(&alice()), 1);

        // Releasing the evicted ticket is a no-op.
        admission.release(&alice(), t1);
        assert_eq!(admission.pending(&alice()), 1);
    }

    #[test]
    fn test_release_is_idempotent_and_cleans_up() {
        let (admission, _) = manual();
        let t1 = admission.init(&alice());
        admission.release(&alice(), t1);
        admission.release(&alice(), t1);
        admission.release(&IdentityKey::new("nobody"), TicketId::new());
        assert_eq!(admission.active_identities(), 0);
    }

    #[test]
    fn test_evicting_every_ticket_drops_the_queue() {
        let (admission, clock) = manual();
        let stale = admission.init(&alice());
        clock.advance(Duration::from_secs(4));

        // A ticket that was never queued walks past the stale one.
        assert!(admission.acquire(&alice(), TicketId::new()));
        assert_eq!(admission.pending(&alice()), 0);
        assert_eq!(admission.active_identities(), 0);

        // A fresh ticket for the same identity starts a new queue.
        let next = admission.init(&alice());
        assert!(admission.acquire(&alice(), next));
        assert_eq!(admission.active_identities(), 1);
        admission.release(&alice(), stale);
        assert_eq!(admission.pending(&alice()), 1);
    }

    #[test]
    fn test_identities_do_not_block_each_other() {
        let (admission, _) = manual();
        let a = admission.init(&alice());
        let b = admission.init(&IdentityKey::new("bob"));
        assert!(admission.acquire(&alice(), a));
        assert!(admission.acquire(&IdentityKey::new("bob"), b));
    }

    #[tokio::test]
    async fn test_release_wakes_next_waiter() {
        let admission = Arc::new(EnrollmentAdmission::new(AdmissionConfig {
            fallback_wait: Duration::from_secs(3600),
            ..Default::default()
        }));
        let first = admission.init(&alice());
        let second = admission.init(&alice());

        let waiter = {
            let admission = Arc::clone(&admission);
            tokio::spawn(async move { admission.wait_for_turn(&alice(), second).await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        admission.release(&alice(), first);
        let result = tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_crashed_holder_evicted_by_fallback_timer() {
        let admission = EnrollmentAdmission::new(AdmissionConfig::default());
        let started = Instant::now();

        let _crashed = admission.init(&alice());
        let mine = admission.init(&alice());
        admission.wait_for_turn(&alice(), mine).await.unwrap();

        assert!(started.elapsed() > Duration::from_millis(3000));
        assert_eq!(admission.pending(&alice()), 1);
    }

    #[tokio::test]
    async fn test_guard_releases_on_drop() {
        let admission = EnrollmentAdmission::new(AdmissionConfig::default());
        {
            let guard = admission.admit(&alice()).await.unwrap();
            assert_eq!(guard.identity(), &alice());
            assert_eq!(admission.pending(&alice()), 1);
        }
        assert_eq!(admission.pending(&alice()), 0);
    }

    #[tokio::test]
    async fn test_evicted_waiter_reports_error() {
        let (admission, clock) = manual();
        let stale = admission.init(&alice());
        clock.advance(Duration::from_secs(4));
        let _next = admission.init(&alice());

        // Someone else's check evicts the stale head.
        assert!(!admission.acquire(&alice(), TicketId::new()));

        let err = admission.wait_for_turn(&alice(), stale).await.unwrap_err();
        assert_eq!(
            err,
            AdmissionError::TicketEvicted {
                identity: alice(),
                ticket: stale
            }
        );
    }
}
