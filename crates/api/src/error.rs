//! Error types and error handling for the API
//!
//! Crate errors convert into [`ApiError`], which renders the response
//! envelope with the matching status code.

use auth::AuthError;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use data_validator::ValidationError;
use mailer::MailError;
use maintenance::MaintenanceError;
use storage::StorageError;
use thiserror::Error;
use tracing::error;

use crate::response::ApiResponse;

pub const NO_TOKEN: &str = "Unauthorized: No token provided";
pub const INVALID_TOKEN: &str = "Forbidden: Invalid or expired token";
pub const NOT_OWNER: &str = "Forbidden: You do not have access to this resource";

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Logged in full, reported to the client generically
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn forbidden() -> Self {
        ApiError::Forbidden(NOT_OWNER.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(detail) => {
                error!("Request failed: {}", detail);
                "Internal server error".to_string()
            }
            ApiError::BadRequest(m)
            | ApiError::Unauthorized(m)
            | ApiError::Forbidden(m)
            | ApiError::NotFound(m) => m,
        };
        ApiResponse::failure(status, message).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => ApiError::NotFound("Record not found".to_string()),
            StorageError::Conflict(detail) => ApiError::BadRequest(detail),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let message = match &err {
            ValidationError::DuplicateReading(_) => {
                "Mileage data for the date is already stored".to_string()
            }
            ValidationError::BelowPrevious { .. } => {
                "Mileage for the date cannot be less than the previous date".to_string()
            }
            ValidationError::AboveNext { .. } => {
                "Mileage for the date cannot be greater than the next date".to_string()
            }
            other => other.to_string(),
        };
        ApiError::BadRequest(message)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Expired | AuthError::InvalidToken(_) => {
                ApiError::Unauthorized(INVALID_TOKEN.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<MaintenanceError> for ApiError {
    fn from(err: MaintenanceError) -> Self {
        match err {
            MaintenanceError::PartNotFound(_) => ApiError::not_found("Part not found"),
            MaintenanceError::VehicleNotFound(_) => ApiError::not_found("Vehicle not found"),
            MaintenanceError::Storage(e) => e.into(),
        }
    }
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("Blocking task failed: {}", err))
    }
}
