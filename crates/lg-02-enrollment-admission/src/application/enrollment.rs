//! Enrollment service.
//!
//! Registers and enrolls a ledger identity while holding the admission ticket
//! for it, so two requests for the same user never race the certificate
//! authority.

use crate::application::admission::EnrollmentAdmission;
use crate::config::EnrollmentConfig;
use crate::domain::entities::{EnrollmentOutcome, RegistrationRequest};
use crate::domain::errors::EnrollmentError;
use crate::ports::inbound::EnrollmentApi;
use crate::ports::outbound::{CertificateAuthority, IdentityWallet};
use async_trait::async_trait;
use shared_types::{Credentials, IdentityKey};
use std::sync::Arc;
use tracing::{error, info, instrument};

pub struct EnrollmentService {
    config: EnrollmentConfig,
    admission: Arc<EnrollmentAdmission>,
    wallet: Arc<dyn IdentityWallet>,
    authority: Arc<dyn CertificateAuthority>,
}

impl EnrollmentService {
    pub fn new(
        config: EnrollmentConfig,
        admission: Arc<EnrollmentAdmission>,
        wallet: Arc<dyn IdentityWallet>,
        authority: Arc<dyn CertificateAuthority>,
    ) -> Self {
        Self {
            config,
            admission,
            wallet,
            authority,
        }
    }

    pub fn admission(&self) -> &EnrollmentAdmission {
        &self.admission
    }

    /// Registrar credentials, enrolling the registrar with its bootstrap
    /// secret when the wallet does not hold it yet.
    pub async fn ensure_admin(&self) -> Result<Credentials, EnrollmentError> {
        let admin = &self.config.admin;
        if let Some(credentials) = self.wallet.get(admin).await? {
            return Ok(credentials);
        }

        let enrollment = self
            .authority
            .enroll(admin.as_str(), &self.config.admin_secret)
            .await
            .map_err(|err| {
                error!(admin = %admin, error = %err, "failed to enroll admin user");
                EnrollmentError::AdminNotEnrolled(err.to_string())
            })?;

        let credentials = Credentials {
            identity: admin.clone(),
            msp_id: self.config.msp_id.clone(),
            certificate: enrollment.certificate,
            private_key: enrollment.private_key,
        };
        self.wallet.put(credentials.clone()).await?;
        info!(admin = %admin, "successfully enrolled admin user and imported it into the wallet");
        Ok(credentials)
    }

    async fn register_and_enroll(
        &self,
        user: &IdentityKey,
        org: &str,
    ) -> Result<EnrollmentOutcome, EnrollmentError> {
        let admin = self.ensure_admin().await?;

        if self.wallet.get(user).await?.is_some() {
            info!(user = %user, "an identity for the user already exists in the wallet");
            return Ok(EnrollmentOutcome::AlreadyEnrolled);
        }

        let request = RegistrationRequest {
            enrollment_id: user.as_str().to_string(),
            affiliation: self.config.affiliation(org),
            role: self.config.role.clone(),
        };
        let secret = self.authority.register(&request, &admin).await?;
        let enrollment = self.authority.enroll(user.as_str(), &secret).await?;

        self.wallet
            .put(Credentials {
                identity: user.clone(),
                msp_id: self.config.msp_id.clone(),
                certificate: enrollment.certificate,
                private_key: enrollment.private_key,
            })
            .await?;

        info!(user = %user, "successfully registered and enrolled user and imported it into the wallet");
        Ok(EnrollmentOutcome::Enrolled)
    }
}

#[async_trait]
impl EnrollmentApi for EnrollmentService {
    #[instrument(skip(self, user), fields(user = %user))]
    async fn enroll(&self, user: &IdentityKey, org: &str) -> Result<EnrollmentOutcome, EnrollmentError> {
        let _turn = self.admission.admit(user).await?;

        let result = self.register_and_enroll(user, org).await;
        if let Err(err) = &result {
            error!(user = %user, error = %err, "failed to register user");
        }
        result
    }
}
