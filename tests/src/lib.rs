//! # Ledger Gateway Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs          # Wired in-process network shared by tests and benches
//! └── integration/
//!     ├── scenarios.rs     # Submit-and-confirm scenarios across lg-01 / shared-types
//!     ├── enrollment.rs    # Admission + enrollment + coordinator together
//!     ├── properties.rs    # Aggregate properties over arbitrary peer failures
//!     └── http.rs          # Full stack through the HTTP facade
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lg-tests
//! cargo test -p lg-tests integration::scenarios::
//! cargo bench -p lg-tests
//! ```

pub mod fixtures;
pub mod integration;
