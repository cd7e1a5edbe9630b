//! Adapters: in-memory wallet, simulated certificate authority and a
//! manually driven time source.

pub mod clock;
pub mod memory_wallet;
pub mod simulated_ca;

pub use clock::ManualTimeSource;
pub use memory_wallet::MemoryWallet;
pub use simulated_ca::SimulatedCertificateAuthority;
