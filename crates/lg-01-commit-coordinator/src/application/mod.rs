//! Application layer: the coordinator service and its per-peer watches.

pub mod commit_watch;
pub mod service;
pub mod stats;
