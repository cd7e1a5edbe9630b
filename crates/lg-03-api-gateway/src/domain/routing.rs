//! Chaincode resolution and argument decoding.

use crate::domain::config::LedgerConfig;
use crate::domain::error::ApiError;
use serde_json::Value;

/// Chaincode a call targets.
///
/// An explicit chaincode from the path must be supported. Without one, the
/// function routes decide and the default chaincode catches the rest.
pub fn resolve_chaincode(
    ledger: &LedgerConfig,
    explicit: Option<&str>,
    function: &str,
) -> Result<String, ApiError> {
    match explicit {
        Some(chaincode) if ledger.is_supported(chaincode) => Ok(chaincode.to_string()),
        Some(chaincode) => Err(ApiError::unsupported_chaincode(chaincode)),
        None => Ok(ledger
            .function_routes
            .get(function)
            .unwrap_or(&ledger.default_chaincode)
            .clone()),
    }
}

/// Required, non-empty function name.
pub fn require_function(fcn: Option<String>) -> Result<String, ApiError> {
    fcn.filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::missing_field("'fcn'"))
}

/// Positional string arguments for the proposal.
///
/// With `is_object` the whole JSON value travels as one serialized argument.
/// Otherwise `args` must be an array; strings pass through and other scalars
/// are rendered as JSON text.
pub fn decode_args(args: Option<Value>, is_object: bool) -> Result<Vec<String>, ApiError> {
    let missing = || ApiError::missing_field("'args'");
    match args {
        None | Some(Value::Null) => Err(missing()),
        Some(value) if is_object => Ok(vec![value.to_string()]),
        Some(Value::Array(items)) => Ok(items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect()),
        Some(_) => Err(missing()),
    }
}
