//! Ports module for the commit coordinator
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::TransactionSubmissionApi;
pub use outbound::{ChannelContext, CommitSink, EventWatcher, LedgerClient, WatchOptions, WatchSignal};
