//! Outbound Ports (Driven Ports / SPI)

use crate::domain::entities::{Enrollment, RegistrationRequest};
use crate::domain::errors::EnrollmentError;
use async_trait::async_trait;
use shared_types::{Credentials, IdentityError, IdentityKey};
use tokio::time::Instant;

/// Time source for ticket issue times and staleness checks.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Instant;
}

/// Default time source backed by the tokio clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Credential store keyed by identity.
#[async_trait]
pub trait IdentityWallet: Send + Sync {
    async fn get(&self, key: &IdentityKey) -> Result<Option<Credentials>, IdentityError>;

    async fn put(&self, credentials: Credentials) -> Result<(), IdentityError>;
}

/// Certificate authority issuing ledger identities.
///
/// `register` is not idempotent: registering the same enrollment id twice
/// fails on the authority side.
#[async_trait]
pub trait CertificateAuthority: Send + Sync {
    /// Register `request` using `registrar`'s authority; returns the
    /// one-time enrollment secret.
    async fn register(
        &self,
        request: &RegistrationRequest,
        registrar: &Credentials,
    ) -> Result<String, EnrollmentError>;

    /// Exchange an enrollment id and secret for certificate material.
    async fn enroll(&self, enrollment_id: &str, secret: &str) -> Result<Enrollment, EnrollmentError>;
}
