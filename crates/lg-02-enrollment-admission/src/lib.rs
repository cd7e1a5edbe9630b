//! # LG-02: Enrollment Admission
//!
//! Credential registration against the certificate authority is not
//! idempotent, so concurrent enrollments for the same identity must not
//! overlap. This crate serializes them with a per-identity FIFO:
//!
//! ```text
//!  init(alice) ─→ [t1]                 t1 admitted
//!  init(alice) ─→ [t1, t2]             t2 waits (wake on release)
//!  release(t1) ─→ [t2]                 t2 admitted
//!  t1 never released, 3 s later  ─→    t1 evicted by the next check
//! ```
//!
//! `EnrollmentService` runs the register-and-enroll flow while holding the
//! caller's ticket.
//!
//! ## Architecture
//!
//! - **Domain**: `AdmissionQueue`, tickets, enrollment entities and errors
//! - **Ports**: Inbound (`EnrollmentApi`) and Outbound (`IdentityWallet`,
//!   `CertificateAuthority`, `TimeSource`)
//! - **Application**: `EnrollmentAdmission`, `EnrollmentService`
//! - **Adapters**: `MemoryWallet`, `SimulatedCertificateAuthority`,
//!   `ManualTimeSource`

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::admission::{AdmissionGuard, EnrollmentAdmission};
pub use application::enrollment::EnrollmentService;
pub use config::{AdmissionConfig, EnrollmentConfig};
pub use domain::{
    AdmissionError, AdmissionTicket, Enrollment, EnrollmentError, EnrollmentOutcome,
    RegistrationRequest, TicketId,
};
pub use ports::{CertificateAuthority, EnrollmentApi, IdentityWallet, SystemTimeSource, TimeSource};
