//! Admission and enrollment configuration.

use serde::{Deserialize, Serialize};
use shared_types::{IdentityKey, MspId};
use std::time::Duration;
use thiserror::Error;

/// Admission queue configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// A head ticket older than this is evicted by the next waiter.
    #[serde(with = "humantime_serde")]
    pub stale_after: Duration,
    /// Longest a waiter sleeps before re-checking without a release wake-up.
    #[serde(with = "humantime_serde")]
    pub fallback_wait: Duration,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_millis(3000),
            fallback_wait: Duration::from_secs(1),
        }
    }
}

impl AdmissionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stale_after.is_zero() {
            return Err(ConfigError::InvalidDuration("stale_after cannot be 0".into()));
        }
        if self.fallback_wait.is_zero() {
            return Err(ConfigError::InvalidDuration("fallback_wait cannot be 0".into()));
        }
        Ok(())
    }
}

/// Enrollment flow configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollmentConfig {
    /// Registrar identity used for register calls.
    pub admin: IdentityKey,
    /// Bootstrap secret for enrolling the registrar.
    pub admin_secret: String,
    /// MSP the issued identities belong to.
    pub msp_id: MspId,
    /// Department appended to the organisation for new identities.
    pub department: String,
    /// Role assigned to new identities.
    pub role: String,
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self {
            admin: IdentityKey::new("admin"),
            admin_secret: "adminpw".to_string(),
            msp_id: MspId("CoinsMSP".to_string()),
            department: "department1".to_string(),
            role: "client".to_string(),
        }
    }
}

impl EnrollmentConfig {
    /// Affiliation for a new identity of `org`, e.g. `coins.department1`.
    pub fn affiliation(&self, org: &str) -> String {
        format!("{}.{}", org, self.department)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin.as_str().is_empty() {
            return Err(ConfigError::MissingField("admin"));
        }
        if self.msp_id.0.is_empty() {
            return Err(ConfigError::MissingField("msp_id"));
        }
        if self.role.is_empty() {
            return Err(ConfigError::MissingField("role"));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let admission = AdmissionConfig::default();
        assert_eq!(admission.stale_after, Duration::from_millis(3000));
        assert_eq!(admission.fallback_wait, Duration::from_secs(1));
        assert!(admission.validate().is_ok());

        let enrollment = EnrollmentConfig::default();
        assert_eq!(enrollment.affiliation("coins"), "coins.department1");
        assert!(enrollment.validate().is_ok());
    }

    #[test]
    fn test_zero_staleness_rejected() {
        let config = AdmissionConfig {
            stale_after: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDuration(_))));
    }

    #[test]
    fn test_empty_role_rejected() {
        let config = EnrollmentConfig {
            role: String::new(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::MissingField("role")));
    }
}
