//! REST endpoint handlers.

use crate::domain::error::{ApiError, ApiResult};
use crate::domain::routing::{decode_args, require_function, resolve_chaincode};
use crate::domain::types::{
    decode_payload, ChaincodeRequest, EnrollRequest, EnrollResponse, HealthResponse,
    InvokeResponse, QueryResponse, UpgradeRequest,
};
use crate::rest::extract::{body_rejection, Caller};
use crate::rest::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use lg_01_commit_coordinator::{AggregatedOutcome, EvaluateRequest, SubmitRequest};
use shared_types::IdentityKey;
use tracing::{debug, info};

const DEFAULT_INIT_FUNCTION: &str = "init";

/// `POST /enroll`: register and enroll a user into the wallet.
pub async fn enroll(
    State(state): State<AppState>,
    body: Result<Json<EnrollRequest>, JsonRejection>,
) -> ApiResult<Json<EnrollResponse>> {
    let Json(request) = body.map_err(body_rejection)?;

    let username = request
        .username
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::missing_field("'username' or 'orgName'"))?;
    let org_name = request
        .org_name
        .filter(|o| !o.is_empty())
        .unwrap_or_else(|| state.ledger.default_org.clone());
    debug!(username = %username, org = %org_name, "enroll request");

    let outcome = state
        .enrollment
        .enroll(&IdentityKey::new(username.as_str()), &org_name)
        .await?;

    Ok(Json(EnrollResponse {
        success: true,
        username,
        org_name,
        outcome,
    }))
}

/// `POST /invoke`
pub async fn invoke(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<ChaincodeRequest>, JsonRejection>,
) -> ApiResult<Json<InvokeResponse>> {
    let Json(request) = body.map_err(body_rejection)?;
    submit(&state, caller, None, request).await
}

/// `POST /invoke/:chaincode`
pub async fn invoke_chaincode(
    State(state): State<AppState>,
    Path(chaincode): Path<String>,
    caller: Caller,
    body: Result<Json<ChaincodeRequest>, JsonRejection>,
) -> ApiResult<Json<InvokeResponse>> {
    let Json(request) = body.map_err(body_rejection)?;
    submit(&state, caller, Some(chaincode), request).await
}

/// `POST /query`
pub async fn query(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<ChaincodeRequest>, JsonRejection>,
) -> ApiResult<Json<QueryResponse>> {
    let Json(request) = body.map_err(body_rejection)?;
    evaluate(&state, caller, None, request).await
}

/// `POST /query/:chaincode`
pub async fn query_chaincode(
    State(state): State<AppState>,
    Path(chaincode): Path<String>,
    caller: Caller,
    body: Result<Json<ChaincodeRequest>, JsonRejection>,
) -> ApiResult<Json<QueryResponse>> {
    let Json(request) = body.map_err(body_rejection)?;
    evaluate(&state, caller, Some(chaincode), request).await
}

/// `POST /upgrade/:chaincode`: upgrade proposal signed by the admin identity.
pub async fn upgrade(
    State(state): State<AppState>,
    Path(chaincode): Path<String>,
    Caller(caller): Caller,
    body: Result<Json<UpgradeRequest>, JsonRejection>,
) -> ApiResult<Json<InvokeResponse>> {
    let Json(request) = body.map_err(body_rejection)?;

    let version = request
        .version
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::missing_field("'version'"))?;
    let function = request
        .fcn
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| DEFAULT_INIT_FUNCTION.to_string());
    let args = match request.args {
        Some(args) => decode_args(Some(args), request.is_object)?,
        None => Vec::new(),
    };
    let chaincode = resolve_chaincode(&state.ledger, Some(&chaincode), &function)?;

    info!(
        requested_by = %caller,
        chaincode = %chaincode,
        version = %version,
        "chaincode upgrade requested"
    );
    let outcome = state
        .coordinator
        .submit(SubmitRequest {
            signer: state.ledger.admin_identity.clone(),
            channel: state.ledger.channel.clone(),
            chaincode,
            version: Some(version),
            function,
            args,
            commit_timeout: state.commit_timeout,
        })
        .await?
        .into_result()?;

    Ok(Json(committed(outcome)))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "ledger-gateway",
        version: env!("CARGO_PKG_VERSION"),
        channel: state.ledger.channel.clone(),
        coordinator: state.coordinator.stats(),
    })
}

async fn submit(
    state: &AppState,
    Caller(user): Caller,
    chaincode: Option<String>,
    request: ChaincodeRequest,
) -> ApiResult<Json<InvokeResponse>> {
    let function = require_function(request.fcn)?;
    let args = decode_args(request.args, request.is_object)?;
    let chaincode = resolve_chaincode(&state.ledger, chaincode.as_deref(), &function)?;
    debug!(user = %user, chaincode = %chaincode, function = %function, "invoke request");

    let outcome = state
        .coordinator
        .submit(SubmitRequest {
            signer: user,
            channel: state.ledger.channel.clone(),
            chaincode,
            version: None,
            function,
            args,
            commit_timeout: state.commit_timeout,
        })
        .await?
        .into_result()?;

    Ok(Json(committed(outcome)))
}

async fn evaluate(
    state: &AppState,
    Caller(user): Caller,
    chaincode: Option<String>,
    request: ChaincodeRequest,
) -> ApiResult<Json<QueryResponse>> {
    let function = require_function(request.fcn)?;
    let args = decode_args(request.args, request.is_object)?;
    let chaincode = resolve_chaincode(&state.ledger, chaincode.as_deref(), &function)?;
    debug!(user = %user, chaincode = %chaincode, function = %function, "query request");

    let outcome = state
        .coordinator
        .evaluate(EvaluateRequest {
            signer: user,
            channel: state.ledger.channel.clone(),
            chaincode,
            function,
            args,
        })
        .await?;

    Ok(Json(QueryResponse {
        success: true,
        transaction_id: outcome.transaction_id.to_string(),
        payload: decode_payload(&outcome.payload),
    }))
}

fn committed(outcome: AggregatedOutcome) -> InvokeResponse {
    InvokeResponse {
        success: true,
        transaction_id: outcome.transaction_id.to_string(),
        payload: decode_payload(&outcome.payload),
        ordering: outcome.ordering_status,
        commits: outcome.per_peer_commit_status,
    }
}
