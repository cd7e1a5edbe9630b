//! Gateway configuration with validation.

use serde::{Deserialize, Serialize};
use shared_types::IdentityKey;
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Channel, chaincodes and signing identities
    pub ledger: LedgerConfig,
    /// Request validation limits
    pub limits: LimitsConfig,
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
    /// CORS configuration
    pub cors: CorsConfig,
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_request_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_request_size cannot be 0".into(),
            ));
        }

        if self.timeouts.request.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "request timeout cannot be 0".into(),
            ));
        }
        if self.timeouts.commit.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::InvalidTimeout(
                "commit timeout cannot be 0".into(),
            ));
        }

        self.ledger.validate()
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 4000)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 4000,
        }
    }
}

/// Ledger-side settings of the facade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Channel every call targets
    pub channel: String,
    /// Chaincode used when neither the path nor a function route names one
    pub default_chaincode: String,
    /// Chaincodes callers may address
    pub supported_chaincodes: Vec<String>,
    /// Function name → chaincode, consulted when the path names no chaincode
    pub function_routes: BTreeMap<String, String>,
    /// Identity that signs upgrade proposals
    pub admin_identity: IdentityKey,
    /// Organisation used for enrollment when the request omits `orgName`
    pub default_org: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        let mut function_routes = BTreeMap::new();
        function_routes.insert("createFoundation".to_string(), "foundation".to_string());
        function_routes.insert("getFoundations".to_string(), "foundation".to_string());

        Self {
            channel: "mychannel".to_string(),
            default_chaincode: "coins".to_string(),
            supported_chaincodes: vec!["coins".to_string(), "foundation".to_string()],
            function_routes,
            admin_identity: IdentityKey::new("admin"),
            default_org: "coins".to_string(),
        }
    }
}

impl LedgerConfig {
    pub fn is_supported(&self, chaincode: &str) -> bool {
        self.supported_chaincodes.iter().any(|c| c == chaincode)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.channel.is_empty() {
            return Err(ConfigError::Invalid("channel cannot be empty".into()));
        }
        if !self.is_supported(&self.default_chaincode) {
            return Err(ConfigError::Invalid(format!(
                "default chaincode '{}' is not in supported_chaincodes",
                self.default_chaincode
            )));
        }
        if let Some((function, target)) = self
            .function_routes
            .iter()
            .find(|(_, target)| !self.is_supported(target))
        {
            return Err(ConfigError::Invalid(format!(
                "route {function} targets unsupported chaincode '{target}'"
            )));
        }
        Ok(())
    }
}

/// Request validation limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max request body size in bytes (default: 1MB)
    pub max_request_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: 1024 * 1024,
        }
    }
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request budget, enrollment waits and commit watches included
    #[serde(with = "humantime_serde")]
    pub request: Duration,
    /// Per-peer commit watch timeout for invokes; the coordinator default when unset
    #[serde(with = "humantime_serde")]
    pub commit: Option<Duration>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(240),
            commit: None,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable CORS
    pub enabled: bool,
    /// Allowed origins ("*" for all)
    pub allowed_origins: Vec<String>,
    /// Allowed methods
    pub allowed_methods: Vec<String>,
    /// Allowed headers
    pub allowed_headers: Vec<String>,
    /// Expose headers
    pub expose_headers: Vec<String>,
    /// Max age for preflight cache
    pub max_age: u64,
    /// Allow credentials
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()],
            allowed_headers: vec![
                "Content-Type".to_string(),
                crate::domain::types::USER_HEADER.to_string(),
            ],
            expose_headers: vec![],
            max_age: 86400, // 24 hours
            allow_credentials: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid size limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
