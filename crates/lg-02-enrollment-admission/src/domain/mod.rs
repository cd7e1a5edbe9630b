//! Domain layer: the admission queue and enrollment entities.

pub mod entities;
pub mod errors;
pub mod queue;

pub use entities::{Enrollment, EnrollmentOutcome, RegistrationRequest};
pub use errors::{AdmissionError, EnrollmentError};
pub use queue::{AdmissionCheck, AdmissionQueue, AdmissionTicket, TicketId};
