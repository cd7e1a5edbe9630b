//! Wired in-process ledger network.

use lg_01_commit_coordinator::adapters::{SimulatedLedger, SimulatedLedgerBuilder};
use lg_01_commit_coordinator::{
    CoordinatorConfig, LedgerClient, ProposalCoordinator, SubmitRequest,
};
use lg_02_enrollment_admission::adapters::{MemoryWallet, SimulatedCertificateAuthority};
use lg_02_enrollment_admission::{
    AdmissionConfig, CertificateAuthority, EnrollmentAdmission, EnrollmentApi, EnrollmentConfig,
    EnrollmentService, IdentityWallet,
};
use shared_types::{IdentityKey, IdentityProvider};
use std::sync::Arc;
use std::time::Duration;

pub const CHANNEL: &str = "mychannel";
pub const PEERS: [&str; 3] = ["peer1.coins", "peer2.coins", "peer3.coins"];

/// Channel `mychannel` with three well-behaved peers.
pub fn three_peers() -> SimulatedLedgerBuilder {
    PEERS
        .iter()
        .fold(SimulatedLedger::builder().channel(CHANNEL), |builder, peer| {
            builder.peer(peer)
        })
}

/// Every service of the gateway over one simulated network.
pub struct Network {
    pub ledger: Arc<SimulatedLedger>,
    pub wallet: Arc<MemoryWallet>,
    pub authority: Arc<SimulatedCertificateAuthority>,
    pub admission: Arc<EnrollmentAdmission>,
    pub enrollment: Arc<EnrollmentService>,
    pub coordinator: Arc<ProposalCoordinator>,
}

impl Network {
    pub fn new(ledger: SimulatedLedger) -> Self {
        Self::with_config(ledger, CoordinatorConfig::default())
    }

    pub fn with_config(ledger: SimulatedLedger, config: CoordinatorConfig) -> Self {
        Self::assemble(ledger, config, SimulatedCertificateAuthority::new("admin", "adminpw"))
    }

    /// Network whose certificate authority answers after `latency`.
    pub fn with_slow_authority(ledger: SimulatedLedger, latency: Duration) -> Self {
        Self::assemble(
            ledger,
            CoordinatorConfig::default(),
            SimulatedCertificateAuthority::new("admin", "adminpw").with_latency(latency),
        )
    }

    fn assemble(
        ledger: SimulatedLedger,
        config: CoordinatorConfig,
        authority: SimulatedCertificateAuthority,
    ) -> Self {
        let ledger = Arc::new(ledger);
        let wallet = Arc::new(MemoryWallet::new());
        let authority = Arc::new(authority);
        let admission = Arc::new(EnrollmentAdmission::new(AdmissionConfig::default()));
        let enrollment = Arc::new(EnrollmentService::new(
            EnrollmentConfig::default(),
            Arc::clone(&admission),
            Arc::clone(&wallet) as Arc<dyn IdentityWallet>,
            Arc::clone(&authority) as Arc<dyn CertificateAuthority>,
        ));
        let coordinator = Arc::new(ProposalCoordinator::with_config(
            config,
            Arc::clone(&ledger) as Arc<dyn LedgerClient>,
            Arc::clone(&wallet) as Arc<dyn IdentityProvider>,
        ));

        Self {
            ledger,
            wallet,
            authority,
            admission,
            enrollment,
            coordinator,
        }
    }

    /// Enroll `user` into the wallet and return its key.
    pub async fn enroll(&self, user: &str) -> IdentityKey {
        let key = IdentityKey::new(user);
        self.enrollment
            .enroll(&key, "coins")
            .await
            .unwrap_or_else(|err| panic!("enrolling {user} failed: {err}"));
        key
    }
}

/// A `transfer` invocation on the coins chaincode.
pub fn transfer(signer: &IdentityKey, amount: u64) -> SubmitRequest {
    SubmitRequest {
        signer: signer.clone(),
        channel: CHANNEL.to_string(),
        chaincode: "coins".to_string(),
        version: None,
        function: "transfer".to_string(),
        args: vec!["bob".to_string(), amount.to_string()],
        commit_timeout: None,
    }
}
