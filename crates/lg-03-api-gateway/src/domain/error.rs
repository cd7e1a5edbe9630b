//! Gateway error types and their HTTP rendering.
//!
//! Every failure leaves the gateway as `{"success": false, "message": ...}`
//! with a status that tells the failure classes apart. Transport causes are
//! logged, never echoed to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lg_01_commit_coordinator::CoordinatorError;
use lg_02_enrollment_admission::{AdmissionError, EnrollmentError};
use serde_json::json;
use std::fmt;
use tracing::warn;

pub type ApiResult<T> = Result<T, ApiError>;

/// An error answer of the HTTP facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// A required request field is absent or has the wrong shape.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            format!("Field: {} is missing or invalid in the request", field),
        )
    }

    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, details)
    }

    pub fn unsupported_chaincode(chaincode: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            format!("Chaincode '{}' is not supported", chaincode),
        )
    }

    /// The caller did not say who they are.
    pub fn unauthenticated(header: &str) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            format!("Missing caller identity, set the '{}' header", header),
        )
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, details)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

impl From<CoordinatorError> for ApiError {
    fn from(err: CoordinatorError) -> Self {
        let status = match &err {
            CoordinatorError::IdentityNotFound(_) => StatusCode::UNAUTHORIZED,
            CoordinatorError::IdentityUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CoordinatorError::ChannelNotFound(_) => StatusCode::NOT_FOUND,
            CoordinatorError::EndorsementRejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            CoordinatorError::OrderingFailed { .. } => StatusCode::BAD_GATEWAY,
            CoordinatorError::CommitTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            CoordinatorError::CommitInvalid { .. } => StatusCode::CONFLICT,
            CoordinatorError::TransportError { .. } => StatusCode::SERVICE_UNAVAILABLE,
        };
        let message = match &err {
            CoordinatorError::IdentityUnavailable(cause) => {
                warn!(error = %cause, "identity store unavailable");
                "Identity store unavailable".to_string()
            }
            CoordinatorError::TransportError { peer_id, cause } => {
                warn!(peer = %peer_id, error = %cause, "ledger participant unreachable");
                format!("Ledger participant {} is unreachable", peer_id)
            }
            other => other.to_string(),
        };
        Self::new(status, message)
    }
}

impl From<EnrollmentError> for ApiError {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::Admission(AdmissionError::TicketEvicted { identity, .. }) => Self::new(
                StatusCode::TOO_MANY_REQUESTS,
                format!("Enrollment for \"{}\" is already in progress, retry later", identity),
            ),
            EnrollmentError::AdminNotEnrolled(cause) => {
                warn!(error = %cause, "admin identity could not be enrolled");
                Self::internal("Admin identity is not enrolled")
            }
            EnrollmentError::Authority(cause) => Self::bad_request(cause),
            EnrollmentError::Wallet(cause) => {
                warn!(error = %cause, "wallet unavailable");
                Self::internal("Identity wallet unavailable")
            }
        }
    }
}

/// Gateway lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to bind to address
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    /// Server stopped with an I/O error
    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}
