//! HTTP adapter (axum).

mod controller;
mod response;

pub use controller::{AppState, SIGNATURE_HEADER, create_router};
pub use response::{ApiErrorResponse, HealthResponse, WebhookAckResponse};
