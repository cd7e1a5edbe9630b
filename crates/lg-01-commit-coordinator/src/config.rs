//! Configuration for the commit coordinator.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Canonical "endorsed" status returned by a peer.
pub const ENDORSEMENT_OK: u32 = 200;

/// Canonical ordering-service acceptance status.
pub const ORDERING_SUCCESS: &str = "SUCCESS";

/// Canonical validation code for a committed, valid transaction.
pub const VALID_CODE: &str = "VALID";

/// How per-peer commit results feed into `overall_success`.
///
/// An ordering failure always fails the outcome; the policy only decides
/// what the commit watches must report on top of a successful ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// At least `n` watched peers must report the valid code.
    /// Clamped to the number of watched peers.
    AtLeast(usize),
    /// Every watched peer must report the valid code.
    All,
    /// Commit statuses are reported but never fail the outcome.
    Informational,
}

impl CommitPolicy {
    /// Number of valid commits needed when `watched` peers were watched.
    pub fn required_valid(&self, watched: usize) -> usize {
        match self {
            CommitPolicy::AtLeast(n) => (*n).min(watched),
            CommitPolicy::All => watched,
            CommitPolicy::Informational => 0,
        }
    }

    pub fn is_satisfied(&self, valid: usize, watched: usize) -> bool {
        valid >= self.required_valid(watched)
    }
}

impl Default for CommitPolicy {
    fn default() -> Self {
        CommitPolicy::AtLeast(1)
    }
}

/// Coordinator configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Upper bound for the endorsement fan-out. Upgrades take much longer
    /// than plain invocations, so the default is generous.
    #[serde(with = "humantime_serde")]
    pub proposal_timeout: Duration,
    /// Commit-watch timeout used when a request does not carry its own.
    #[serde(with = "humantime_serde")]
    pub commit_timeout: Duration,
    /// Status an endorser must return for its response to count.
    pub endorsement_success_status: u32,
    /// Status the ordering service returns on acceptance.
    pub ordering_success_status: String,
    /// Validation code reported for a committed, valid transaction.
    pub valid_code: String,
    /// Commit aggregation policy.
    pub commit_policy: CommitPolicy,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            proposal_timeout: Duration::from_secs(60),
            commit_timeout: Duration::from_secs(60),
            endorsement_success_status: ENDORSEMENT_OK,
            ordering_success_status: ORDERING_SUCCESS.to_string(),
            valid_code: VALID_CODE.to_string(),
            commit_policy: CommitPolicy::default(),
        }
    }
}

impl CoordinatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.proposal_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "proposal_timeout cannot be 0".into(),
            ));
        }
        if self.commit_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "commit_timeout cannot be 0".into(),
            ));
        }
        if self.valid_code.is_empty() || self.ordering_success_status.is_empty() {
            return Err(ConfigError::EmptyStatusCode);
        }
        if self.commit_policy == CommitPolicy::AtLeast(0) {
            return Err(ConfigError::InvalidPolicy(
                "at_least(0) is meaningless, use informational".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("status codes must not be empty")]
    EmptyStatusCode,

    #[error("invalid commit policy: {0}")]
    InvalidPolicy(String),
}
