//! Per-identity admission queue.
//!
//! Pure data structure: the caller supplies the current instant, so staleness
//! eviction is deterministic under test.

use serde::{Deserialize, Serialize};
use shared_types::IdentityKey;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// Opaque handle for one queue position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(Uuid);

impl TicketId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A queue position for one identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdmissionTicket {
    pub identity: IdentityKey,
    pub ticket_id: TicketId,
    pub issued_at: Instant,
}

impl AdmissionTicket {
    pub fn is_stale(&self, now: Instant, stale_after: Duration) -> bool {
        now.saturating_duration_since(self.issued_at) > stale_after
    }
}

/// Result of an admission check.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdmissionCheck {
    pub admitted: bool,
    /// Stale head tickets dropped while checking.
    pub evicted: Vec<TicketId>,
}

/// FIFO of tickets for a single identity.
#[derive(Clone, Debug, Default)]
pub struct AdmissionQueue {
    tickets: VecDeque<AdmissionTicket>,
}

impl AdmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ticket: AdmissionTicket) {
        self.tickets.push_back(ticket);
    }

    /// Is `ticket_id` at the head?
    ///
    /// Stale tickets ahead of the caller are evicted first. An empty queue
    /// admits anyone, including a caller whose own ticket is already gone.
    pub fn admit(&mut self, ticket_id: TicketId, now: Instant, stale_after: Duration) -> AdmissionCheck {
        let mut evicted = Vec::new();

        while let Some(head) = self.tickets.front() {
            if head.ticket_id == ticket_id {
                return AdmissionCheck {
                    admitted: true,
                    evicted,
                };
            }
            if !head.is_stale(now, stale_after) {
                return AdmissionCheck {
                    admitted: false,
                    evicted,
                };
            }
            if let Some(stale) = self.tickets.pop_front() {
                evicted.push(stale.ticket_id);
            }
        }

        AdmissionCheck {
            admitted: true,
            evicted,
        }
    }

    /// Remove `ticket_id` wherever it sits. Returns whether it was present.
    pub fn remove(&mut self, ticket_id: TicketId) -> bool {
        match self.tickets.iter().position(|t| t.ticket_id == ticket_id) {
            Some(index) => {
                self.tickets.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, ticket_id: TicketId) -> bool {
        self.tickets.iter().any(|t| t.ticket_id == ticket_id)
    }

    pub fn head(&self) -> Option<&AdmissionTicket> {
        self.tickets.front()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}
