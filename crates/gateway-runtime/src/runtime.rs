//! # Gateway Runtime
//!
//! Builds every service from a `RuntimeConfig` in dependency order:
//!
//! 1. In-process ledger network (channel + peers)
//! 2. Identity wallet and certificate authority
//! 3. Enrollment admission and enrollment service
//! 4. Proposal coordinator (signers resolved from the wallet)
//! 5. HTTP gateway

use crate::config::RuntimeConfig;
use anyhow::{Context, Result};
use lg_01_commit_coordinator::adapters::SimulatedLedger;
use lg_01_commit_coordinator::{LedgerClient, ProposalCoordinator, TransactionSubmissionApi};
use lg_02_enrollment_admission::adapters::{MemoryWallet, SimulatedCertificateAuthority};
use lg_02_enrollment_admission::{
    CertificateAuthority, EnrollmentAdmission, EnrollmentApi, EnrollmentService, IdentityWallet,
};
use lg_03_api_gateway::{LedgerGatewayService, ShutdownHandle};
use shared_types::IdentityProvider;
use std::sync::Arc;
use tracing::info;

/// The wired gateway and the collaborators it runs on.
pub struct GatewayRuntime {
    config: RuntimeConfig,
    ledger: Arc<SimulatedLedger>,
    wallet: Arc<MemoryWallet>,
    enrollment: Arc<EnrollmentService>,
    coordinator: Arc<ProposalCoordinator>,
    gateway: LedgerGatewayService,
}

impl GatewayRuntime {
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        config.validate()?;

        let mut network = SimulatedLedger::builder().channel(&config.gateway.ledger.channel);
        for peer in &config.network.peers {
            network = network.peer(peer);
        }
        let ledger = Arc::new(network.build());
        info!(
            channel = %config.gateway.ledger.channel,
            peers = config.network.peers.len(),
            "ledger network ready"
        );

        let wallet = Arc::new(MemoryWallet::new());
        let authority = Arc::new(SimulatedCertificateAuthority::new(
            config.enrollment.admin.as_str(),
            &config.enrollment.admin_secret,
        ));

        let admission = Arc::new(EnrollmentAdmission::new(config.admission.clone()));
        let enrollment = Arc::new(EnrollmentService::new(
            config.enrollment.clone(),
            admission,
            Arc::clone(&wallet) as Arc<dyn IdentityWallet>,
            authority as Arc<dyn CertificateAuthority>,
        ));

        let coordinator = Arc::new(ProposalCoordinator::with_config(
            config.coordinator.clone(),
            Arc::clone(&ledger) as Arc<dyn LedgerClient>,
            Arc::clone(&wallet) as Arc<dyn IdentityProvider>,
        ));

        let gateway = LedgerGatewayService::new(
            config.gateway.clone(),
            Arc::clone(&coordinator) as Arc<dyn TransactionSubmissionApi>,
            Arc::clone(&enrollment) as Arc<dyn EnrollmentApi>,
        )
        .context("failed to create the HTTP gateway")?;

        Ok(Self {
            config,
            ledger,
            wallet,
            enrollment,
            coordinator,
            gateway,
        })
    }

    /// Enroll the registrar so the first user request does not pay for it.
    pub async fn bootstrap(&self) -> Result<()> {
        let admin = self
            .enrollment
            .ensure_admin()
            .await
            .context("failed to enroll the admin identity")?;
        info!(
            admin = %admin.identity,
            msp = %admin.msp_id,
            fingerprint = %admin.fingerprint(),
            "admin identity ready"
        );
        Ok(())
    }

    /// Bootstrap, then serve until the shutdown handle fires.
    pub async fn run(&self) -> Result<()> {
        info!("===========================================");
        info!("  Ledger Gateway v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        self.bootstrap().await?;
        info!(addr = %self.config.gateway.http_addr(), "HTTP address");
        self.gateway
            .start()
            .await
            .context("HTTP gateway stopped with an error")
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.gateway.shutdown_handle()
    }

    pub fn gateway(&self) -> &LedgerGatewayService {
        &self.gateway
    }

    pub fn ledger(&self) -> &Arc<SimulatedLedger> {
        &self.ledger
    }

    pub fn wallet(&self) -> &Arc<MemoryWallet> {
        &self.wallet
    }

    pub fn coordinator(&self) -> &Arc<ProposalCoordinator> {
        &self.coordinator
    }
}
