//! Rate Limiting Middleware using GCRA Algorithm
//!
//! Per-IP limits for the credential endpoints (login and register) using
//! tower_governor. Peer addresses come from `ConnectInfo`, so the server must
//! be started with `into_make_service_with_connect_info::<SocketAddr>()`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use governor::middleware::StateInformationMiddleware;
use serde::Deserialize;
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorError;
use tracing::warn;

use crate::response::ApiResponse;

/// Governor config keyed by peer IP, reporting quota headers
pub type CredentialGovernorConfig =
    tower_governor::governor::GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Seconds to replenish one request
    pub per_second: u64,
    /// Requests that can be made immediately
    pub burst_size: u32,
}

/// Strict quota: one request every 4 seconds, burst of 2
impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            per_second: 4,
            burst_size: 2,
        }
    }
}

impl RateLimitConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Build the governor config, or `None` when limiting is off or the quota
/// is unusable (zero period or burst).
///
/// Adds X-RateLimit-* headers to responses.
pub fn create_governor_config(config: &RateLimitConfig) -> Option<Arc<CredentialGovernorConfig>> {
    if !config.enabled {
        return None;
    }

    let governor = GovernorConfigBuilder::default()
        .per_second(config.per_second)
        .burst_size(config.burst_size)
        .use_headers()
        .error_handler(rejection_response)
        .finish();
    if governor.is_none() {
        warn!(
            "Rate limiting disabled: invalid quota (per_second={}, burst_size={})",
            config.per_second, config.burst_size
        );
    }
    governor.map(Arc::new)
}

/// Render a limiter rejection in the response envelope, keeping the
/// quota headers governor attaches
fn rejection_response(error: GovernorError) -> Response {
    let (status, message, headers) = match error {
        GovernorError::TooManyRequests { wait_time, headers } => (
            StatusCode::TOO_MANY_REQUESTS,
            format!("Too many requests, try again in {}s", wait_time),
            headers,
        ),
        GovernorError::UnableToExtractKey => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Unable to identify client".to_string(),
            None,
        ),
        GovernorError::Other { code, msg, headers } => (
            code,
            msg.unwrap_or_else(|| "Request rejected".to_string()),
            headers,
        ),
    };

    let mut response = ApiResponse::failure(status, message).into_response();
    if let Some(headers) = headers {
        response.headers_mut().extend(headers);
    }
    response
}
