//! Inbound Ports (Driving Ports / API)

use crate::domain::entities::EnrollmentOutcome;
use crate::domain::errors::EnrollmentError;
use async_trait::async_trait;
use shared_types::IdentityKey;

/// Enrollment API
///
/// Register and enroll `user` for `org`, one attempt per identity at a time.
#[async_trait]
pub trait EnrollmentApi: Send + Sync {
    async fn enroll(&self, user: &IdentityKey, org: &str) -> Result<EnrollmentOutcome, EnrollmentError>;
}
