//! Payment gateway adapter.

pub mod api_types;
pub mod config;
pub mod error;
pub mod http_client;
pub mod signature;

mod adapter;

pub use adapter::HttpPaymentGateway;
pub use config::{GatewayConfig, RetryConfig};
pub use error::GatewayApiError;
pub use signature::{SignatureError, sign_payload, verify_signature};
