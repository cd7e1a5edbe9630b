//! # LG-01: Commit Coordinator
//!
//! Drives one submit-and-confirm transaction lifecycle against a permissioned
//! ledger network:
//!
//! ```text
//!  resolve signer ─→ resolve channel ─→ new tx id
//!                                          │
//!                          send proposal to every endorser (join)
//!                                          │
//!                              evaluate endorsements ──✗──→ EndorsementRejected
//!                                          │ all good
//!            ┌─────────────────────────────┼──────────────────────────┐
//!       watch(peer 1)  ...            watch(peer N)          (registered first)
//!            │                             │                          │
//!            │                             │                 send to ordering (once)
//!            └──────────────┬──────────────┴──────────────────────────┘
//!                           │  join over N + 1 signals
//!                    AggregatedOutcome
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: proposal/endorsement/commit entities, endorsement policy,
//!   outcome aggregation, error taxonomy
//! - **Ports**: Inbound (`TransactionSubmissionApi`) and Outbound
//!   (`LedgerClient`, `EventWatcher`)
//! - **Application**: `ProposalCoordinator` and one-shot `CommitWatch`
//! - **Adapters**: scriptable in-process ledger used by the dev runtime and tests

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::commit_watch::CommitWatch;
pub use application::service::ProposalCoordinator;
pub use application::stats::{CoordinatorStats, StatsSnapshot};
pub use config::{CommitPolicy, CoordinatorConfig};
pub use domain::entities::*;
pub use domain::errors::CoordinatorError;
pub use ports::inbound::TransactionSubmissionApi;
pub use ports::outbound::{
    ChannelContext, CommitSink, EventWatcher, LedgerClient, WatchOptions, WatchSignal,
};
