//! Request extractors.

use crate::domain::error::ApiError;
use crate::domain::types::USER_HEADER;
use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use shared_types::IdentityKey;

/// Identity of the caller, taken from the user header.
///
/// The header value is trusted as-is. No token or signature is checked, so
/// any client that reaches the gateway can act as any enrolled identity.
/// Deploy it behind a proxy that authenticates callers and sets the header
/// itself, stripping any value the client sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub IdentityKey);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .map(|user| Caller(IdentityKey::new(user)))
            .ok_or_else(|| ApiError::unauthenticated(USER_HEADER))
    }
}

/// Body that is not valid JSON for the endpoint, or too large.
pub fn body_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::new(rejection.status(), rejection.body_text())
}
