//! Response Envelope
//!
//! Every JSON endpoint answers with `{ success, code, message, payload }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub code: u16,
    pub message: String,
    pub payload: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with payload
    pub fn ok(message: impl Into<String>, payload: T) -> Self {
        Self::with_status(StatusCode::OK, message, Some(payload))
    }

    /// 201 with payload
    pub fn created(message: impl Into<String>, payload: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, Some(payload))
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>, payload: Option<T>) -> Self {
        Self {
            success: status.is_success(),
            code: status.as_u16(),
            message: message.into(),
            payload,
        }
    }
}

impl ApiResponse<()> {
    /// Envelope without payload
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self::with_status(status, message, None)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
