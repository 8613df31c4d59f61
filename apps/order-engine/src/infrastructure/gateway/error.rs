//! Gateway-specific error types.

use thiserror::Error;

use crate::application::ports::GatewayError;

/// Errors from the gateway HTTP adapter.
#[derive(Debug, Error, Clone)]
pub enum GatewayApiError {
    /// Network error (retryable).
    #[error("Network error: {0}")]
    Network(String),

    /// API returned an error.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code from the API.
        code: String,
        /// Error message from the API.
        message: String,
    },

    /// Request was rejected by the gateway.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Authentication failed.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Suggested retry delay in seconds.
        retry_after_secs: u64,
    },

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Max retries exceeded.
    #[error("Max retries exceeded after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Number of attempts made before giving up.
        attempts: u32,
    },
}

impl From<GatewayApiError> for GatewayError {
    fn from(err: GatewayApiError) -> Self {
        match err {
            GatewayApiError::Network(msg) => Self::Unavailable(msg),
            GatewayApiError::MaxRetriesExceeded { attempts } => {
                Self::Unavailable(format!("gave up after {attempts} attempts"))
            }
            GatewayApiError::RateLimited { retry_after_secs } => {
                Self::Unavailable(format!("rate limited for {retry_after_secs}s"))
            }
            GatewayApiError::Rejected(msg) => Self::Rejected(msg),
            GatewayApiError::Api { code, message } => Self::Rejected(format!("{code}: {message}")),
            GatewayApiError::AuthenticationFailed => Self::Authentication,
            GatewayApiError::JsonParse(msg) => Self::Protocol(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_errors_map_to_port_errors() {
        let err: GatewayError = GatewayApiError::Network("refused".to_string()).into();
        assert!(matches!(err, GatewayError::Unavailable(_)));

        let err: GatewayError = GatewayApiError::Rejected("bad amount".to_string()).into();
        assert!(matches!(err, GatewayError::Rejected(_)));

        let err: GatewayError = GatewayApiError::AuthenticationFailed.into();
        assert!(matches!(err, GatewayError::Authentication));
    }
}
