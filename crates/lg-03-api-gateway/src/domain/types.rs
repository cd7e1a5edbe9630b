//! Request and response bodies of the REST surface.

use lg_01_commit_coordinator::{OrderingStatus, PeerCommitStatus, StatsSnapshot};
use lg_02_enrollment_admission::EnrollmentOutcome;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::PeerId;
use std::collections::BTreeMap;

/// Header carrying the caller's identity key.
pub const USER_HEADER: &str = "x-ledger-user";

// =============================================================================
// REQUESTS
// =============================================================================

/// `POST /enroll`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub username: Option<String>,
    pub org_name: Option<String>,
}

/// `POST /invoke[/:chaincode]` and `POST /query[/:chaincode]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChaincodeRequest {
    pub fcn: Option<String>,
    /// An array of arguments, or any JSON value when `is_object` is set.
    pub args: Option<Value>,
    #[serde(default)]
    pub is_object: bool,
}

/// `POST /upgrade/:chaincode`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeRequest {
    pub version: Option<String>,
    /// Initialisation function, `init` when omitted.
    pub fcn: Option<String>,
    pub args: Option<Value>,
    #[serde(default)]
    pub is_object: bool,
}

// =============================================================================
// RESPONSES
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollResponse {
    pub success: bool,
    pub username: String,
    pub org_name: String,
    pub outcome: EnrollmentOutcome,
}

/// Answer of a committed invoke or upgrade.
#[derive(Debug, Clone, Serialize)]
pub struct InvokeResponse {
    pub success: bool,
    #[serde(rename = "transactionID")]
    pub transaction_id: String,
    pub payload: Value,
    pub ordering: OrderingStatus,
    pub commits: BTreeMap<PeerId, PeerCommitStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub success: bool,
    #[serde(rename = "transactionID")]
    pub transaction_id: String,
    pub payload: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub channel: String,
    pub coordinator: StatsSnapshot,
}

/// Chaincode return value as JSON when it parses, as a string otherwise.
pub fn decode_payload(payload: &[u8]) -> Value {
    serde_json::from_slice(payload)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(payload).into_owned()))
}
