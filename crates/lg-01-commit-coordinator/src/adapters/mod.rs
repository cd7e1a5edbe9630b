//! Adapters for the commit coordinator.
//!
//! Only the simulated network lives here; production ledger bindings plug in
//! through the same `LedgerClient`/`EventWatcher` ports.

pub mod simulated;

pub use simulated::{
    CallJournal, CommitBehavior, EndorsementBehavior, LedgerCall, OrderingBehavior,
    SimulatedEventWatcher, SimulatedLedger, SimulatedLedgerBuilder,
};
