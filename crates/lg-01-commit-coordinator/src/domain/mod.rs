//! Domain layer for the commit coordinator
//!
//! Contains entities, the endorsement policy, outcome aggregation and errors.

pub mod aggregation;
pub mod entities;
pub mod errors;
pub mod policy;

pub use aggregation::aggregate;
pub use entities::*;
pub use errors::CoordinatorError;
pub use policy::{evaluate_endorsements, first_payload, EndorsementVerdict};
