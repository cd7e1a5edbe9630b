//! Error types for admission and enrollment.

use crate::domain::queue::TicketId;
use shared_types::{IdentityError, IdentityKey};
use thiserror::Error;

/// Admission queue failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// The caller's ticket was evicted as stale before it reached the head.
    #[error("admission ticket {ticket} for \"{identity}\" was evicted")]
    TicketEvicted {
        identity: IdentityKey,
        ticket: TicketId,
    },
}

/// Enrollment flow failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrollmentError {
    #[error(transparent)]
    Admission(#[from] AdmissionError),

    /// The registrar identity is missing and could not be enrolled.
    #[error("Admin identity is not enrolled: {0}")]
    AdminNotEnrolled(String),

    /// The certificate authority refused a register or enroll call.
    #[error("certificate authority error: {0}")]
    Authority(String),

    #[error(transparent)]
    Wallet(#[from] IdentityError),
}
