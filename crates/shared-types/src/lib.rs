//! # Shared Types Crate
//!
//! Types that cross crate boundaries in the ledger gateway: who is calling
//! (`IdentityKey`, `Credentials`), which participant answered (`PeerId`) and
//! which operation a signal belongs to (`TransactionId`).
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identity and correlation types live here and
//!   nowhere else.
//! - **Opaque identifiers**: ids are newtypes; callers never build them from
//!   raw strings except at the HTTP boundary.
//! - **Ports at the edge**: `IdentityProvider` is the only trait defined here,
//!   because both the coordinator and the enrollment flow consume it.

pub mod entities;
pub mod errors;
pub mod identity;

pub use entities::*;
pub use errors::*;
pub use identity::IdentityProvider;
