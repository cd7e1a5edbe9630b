//! Simulated certificate authority.
//!
//! Keeps registrations in memory and issues stand-in certificate material.
//! Registering an enrollment id twice fails, like a real authority does, which
//! is exactly the hazard admission guards against.

use crate::domain::entities::{Enrollment, RegistrationRequest};
use crate::domain::errors::EnrollmentError;
use crate::ports::outbound::CertificateAuthority;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use shared_types::Credentials;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Registration {
    secret: String,
    affiliation: String,
    role: String,
}

/// In-process certificate authority.
pub struct SimulatedCertificateAuthority {
    bootstrap_id: String,
    bootstrap_secret: String,
    registrations: DashMap<String, Registration>,
    /// Certificates issued so far, by enrollment id.
    issued: DashMap<String, String>,
    latency: Option<Duration>,
    register_calls: AtomicUsize,
    enroll_calls: AtomicUsize,
}

impl SimulatedCertificateAuthority {
    pub fn new(bootstrap_id: &str, bootstrap_secret: &str) -> Self {
        Self {
            bootstrap_id: bootstrap_id.to_string(),
            bootstrap_secret: bootstrap_secret.to_string(),
            registrations: DashMap::new(),
            issued: DashMap::new(),
            latency: None,
            register_calls: AtomicUsize::new(0),
            enroll_calls: AtomicUsize::new(0),
        }
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn enroll_calls(&self) -> usize {
        self.enroll_calls.load(Ordering::SeqCst)
    }

    pub fn is_registered(&self, enrollment_id: &str) -> bool {
        self.registrations.contains_key(enrollment_id)
    }

    /// Affiliation and role recorded for `enrollment_id`.
    pub fn registration(&self, enrollment_id: &str) -> Option<(String, String)> {
        self.registrations
            .get(enrollment_id)
            .map(|r| (r.affiliation.clone(), r.role.clone()))
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn issue(&self, enrollment_id: &str) -> Enrollment {
        let nonce = Uuid::new_v4();
        let mut hasher = Sha256::new();
        hasher.update(enrollment_id.as_bytes());
        hasher.update(nonce.as_bytes());
        let body = hex::encode(hasher.finalize());

        let certificate = format!(
            "-----BEGIN CERTIFICATE-----\n{body}\n-----END CERTIFICATE-----\n"
        );
        let private_key = hex::encode(Sha256::digest(nonce.as_bytes()));
        self.issued
            .insert(enrollment_id.to_string(), certificate.clone());

        Enrollment {
            certificate,
            private_key,
        }
    }

    fn is_trusted(&self, registrar: &Credentials) -> bool {
        self.issued
            .get(registrar.identity.as_str())
            .is_some_and(|cert| *cert == registrar.certificate)
    }
}

#[async_trait]
impl CertificateAuthority for SimulatedCertificateAuthority {
    async fn register(
        &self,
        request: &RegistrationRequest,
        registrar: &Credentials,
    ) -> Result<String, EnrollmentError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        if !self.is_trusted(registrar) {
            return Err(EnrollmentError::Authority(format!(
                "registrar \"{}\" is not authorized",
                registrar.identity
            )));
        }

        match self.registrations.entry(request.enrollment_id.clone()) {
            Entry::Occupied(_) => Err(EnrollmentError::Authority(format!(
                "Identity '{}' is already registered",
                request.enrollment_id
            ))),
            Entry::Vacant(slot) => {
                let secret = Uuid::new_v4().simple().to_string();
                slot.insert(Registration {
                    secret: secret.clone(),
                    affiliation: request.affiliation.clone(),
                    role: request.role.clone(),
                });
                info!(
                    enrollment_id = %request.enrollment_id,
                    affiliation = %request.affiliation,
                    role = %request.role,
                    "identity registered"
                );
                Ok(secret)
            }
        }
    }

    async fn enroll(&self, enrollment_id: &str, secret: &str) -> Result<Enrollment, EnrollmentError> {
        self.enroll_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let authenticated = if enrollment_id == self.bootstrap_id {
            secret == self.bootstrap_secret
        } else {
            self.registrations
                .get(enrollment_id)
                .is_some_and(|r| r.secret == secret)
        };
        if !authenticated {
            return Err(EnrollmentError::Authority(format!(
                "authentication failure for \"{enrollment_id}\""
            )));
        }

        debug!(enrollment_id = %enrollment_id, "certificate issued");
        Ok(self.issue(enrollment_id))
    }
}
