//! Ports layer: inbound API and outbound SPI traits.

pub mod inbound;
pub mod outbound;

pub use inbound::EnrollmentApi;
pub use outbound::{CertificateAuthority, IdentityWallet, SystemTimeSource, TimeSource};
