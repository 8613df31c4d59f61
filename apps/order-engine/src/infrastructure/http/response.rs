//! HTTP response types and error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
}

/// Webhook acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAckResponse {
    /// Always true; the gateway only needs a 2xx.
    pub received: bool,
}

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Stable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.kind().http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ApiErrorResponse {
            code: self.kind().code().to_string(),
            message: self.message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
