//! # Runtime Configuration
//!
//! One struct for every crate's configuration plus the simulated network
//! topology. Loaded from an optional JSON file (`LG_CONFIG`) and then
//! overridden by `LG_*` environment variables.

use anyhow::{bail, Context, Result};
use humantime_serde::re::humantime;
use lg_01_commit_coordinator::CoordinatorConfig;
use lg_02_enrollment_admission::{AdmissionConfig, EnrollmentConfig};
use lg_03_api_gateway::GatewayConfig;
use serde::{Deserialize, Serialize};
use shared_types::{IdentityKey, MspId};
use std::path::Path;
use std::time::Duration;

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub log: LogConfig,
    pub gateway: GatewayConfig,
    pub coordinator: CoordinatorConfig,
    pub admission: AdmissionConfig,
    pub enrollment: EnrollmentConfig,
    pub network: NetworkConfig,
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `info,lg_01_commit_coordinator=debug`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Peers of the in-process ledger network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub peers: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            peers: vec![
                "peer0.coins.example.com:7051".to_string(),
                "peer1.coins.example.com:8051".to_string(),
            ],
        }
    }
}

impl RuntimeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load with `lookup` standing in for the environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup("LG_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(level) = lookup("LG_LOG_LEVEL") {
            self.log.level = level;
        }
        if let Some(format) = lookup("LG_LOG_FORMAT") {
            self.log.format = match format.to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" | "text" => LogFormat::Pretty,
                other => bail!("LG_LOG_FORMAT must be 'json' or 'pretty', got '{other}'"),
            };
        }

        if let Some(host) = lookup("LG_HOST") {
            self.gateway.http.host = host
                .parse()
                .with_context(|| format!("LG_HOST is not an IP address: {host}"))?;
        }
        if let Some(port) = lookup("LG_PORT") {
            self.gateway.http.port = port
                .parse()
                .with_context(|| format!("LG_PORT is not a port number: {port}"))?;
        }
        if let Some(timeout) = lookup("LG_REQUEST_TIMEOUT") {
            self.gateway.timeouts.request = parse_duration("LG_REQUEST_TIMEOUT", &timeout)?;
        }
        if let Some(timeout) = lookup("LG_COMMIT_TIMEOUT") {
            self.gateway.timeouts.commit = Some(parse_duration("LG_COMMIT_TIMEOUT", &timeout)?);
        }

        if let Some(channel) = lookup("LG_CHANNEL") {
            self.gateway.ledger.channel = channel;
        }
        if let Some(chaincode) = lookup("LG_DEFAULT_CHAINCODE") {
            self.gateway.ledger.default_chaincode = chaincode;
        }

        if let Some(admin) = lookup("LG_ADMIN") {
            self.enrollment.admin = IdentityKey::new(admin.as_str());
            self.gateway.ledger.admin_identity = IdentityKey::new(admin);
        }
        if let Some(secret) = lookup("LG_ADMIN_SECRET") {
            self.enrollment.admin_secret = secret;
        }
        if let Some(msp) = lookup("LG_MSP_ID") {
            self.enrollment.msp_id = MspId(msp);
        }

        if let Some(peers) = lookup("LG_PEERS") {
            self.network.peers = peers
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.gateway.validate().context("invalid gateway configuration")?;
        self.coordinator
            .validate()
            .context("invalid coordinator configuration")?;
        self.admission
            .validate()
            .context("invalid admission configuration")?;
        self.enrollment
            .validate()
            .context("invalid enrollment configuration")?;
        if self.network.peers.is_empty() {
            bail!("at least one peer must be configured");
        }
        Ok(())
    }
}

fn parse_duration(key: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value)
        .with_context(|| format!("{key} is not a duration (e.g. '30s'): {value}"))
}
