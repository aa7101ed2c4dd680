//! Request Extractors
//!
//! Wrappers around axum's extractors that reject with the response envelope,
//! plus the bearer-token account extractor.

use auth::Claims;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use crate::error::{ApiError, INVALID_TOKEN, NO_TOKEN};
use crate::state::SharedState;

/// JSON body; malformed input yields a 400 envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters; malformed ids yield a 400 envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string; malformed values yield a 400 envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Account identified by the request's bearer token
#[derive(Debug, Clone)]
pub struct AuthAccount(pub Claims);

impl AuthAccount {
    pub fn id(&self) -> i64 {
        self.0.id
    }

    /// Reject with 403 unless the caller is `account_id`
    pub fn ensure_account(&self, account_id: i64) -> Result<(), ApiError> {
        if self.0.id == account_id {
            Ok(())
        } else {
            debug!("Account {} denied access to account {}", self.0.id, account_id);
            Err(ApiError::forbidden())
        }
    }
}

#[async_trait]
impl FromRequestParts<SharedState> for AuthAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Unauthorized(NO_TOKEN.to_string()))?;

        let claims = state
            .tokens
            .verify(token)
            .map_err(|_| ApiError::Unauthorized(INVALID_TOKEN.to_string()))?;
        Ok(AuthAccount(claims))
    }
}
