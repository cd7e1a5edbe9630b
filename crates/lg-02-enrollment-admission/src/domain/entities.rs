//! Enrollment entities.

use serde::{Deserialize, Serialize};

/// What the certificate authority needs to register a new identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub enrollment_id: String,
    pub affiliation: String,
    pub role: String,
}

/// Certificate material issued by an enroll call.
#[derive(Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub certificate: String,
    pub private_key: String,
}

impl std::fmt::Debug for Enrollment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enrollment")
            .field("certificate", &self.certificate)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// How an enroll call ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentOutcome {
    /// The identity was already in the wallet; the authority was not called.
    AlreadyEnrolled,
    /// Registered, enrolled and stored.
    Enrolled,
}
