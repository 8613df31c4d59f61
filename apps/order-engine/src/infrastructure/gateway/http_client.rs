//! HTTP client wrapper with retry logic.

use std::time::Duration;

use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::api_types::GatewayErrorResponse;
use super::config::{GatewayConfig, RetryConfig};
use super::error::GatewayApiError;

/// HTTP client for the gateway API with retry logic.
#[derive(Debug, Clone)]
pub struct GatewayHttpClient {
    client: Client,
    api_key: String,
    base_url: String,
    retry_config: RetryConfig,
}

impl GatewayHttpClient {
    /// Create a new HTTP client from config.
    ///
    /// # Errors
    ///
    /// Returns error if credentials are missing or the client cannot be
    /// built.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayApiError> {
        if config.api_key.is_empty() {
            return Err(GatewayApiError::AuthenticationFailed);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayApiError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            retry_config: config.retry.clone(),
        })
    }

    /// Make a POST request to the gateway API.
    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayApiError> {
        let url = format!("{}{path}", self.base_url);
        let mut backoff = ExponentialBackoff::new(&self.retry_config);

        loop {
            let request = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(body);

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            error = %e,
                            delay_ms = delay.as_millis(),
                            attempt = backoff.attempt,
                            "Network error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(GatewayApiError::MaxRetriesExceeded {
                        attempts: backoff.attempt,
                    });
                }
            };

            let status = response.status();

            if status.is_success() {
                let text = response
                    .text()
                    .await
                    .map_err(|e| GatewayApiError::Network(e.to_string()))?;
                return serde_json::from_str(&text)
                    .map_err(|e| GatewayApiError::JsonParse(e.to_string()));
            }

            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());

            let error_body = response.text().await.unwrap_or_default();
            let (error_code, error_message) =
                match serde_json::from_str::<GatewayErrorResponse>(&error_body) {
                    Ok(err) => (
                        err.code.unwrap_or_else(|| status.as_u16().to_string()),
                        err.message,
                    ),
                    Err(_) => (status.as_u16().to_string(), error_body),
                };

            match categorize_status(status) {
                ErrorCategory::RateLimited => {
                    let delay = retry_after
                        .map(Duration::from_secs)
                        .or_else(|| backoff.next_backoff());
                    if let Some(delay) = delay {
                        tracing::warn!(
                            code = %error_code,
                            delay_ms = delay.as_millis(),
                            "Rate limited, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(GatewayApiError::RateLimited {
                        retry_after_secs: retry_after.unwrap_or(60),
                    });
                }
                ErrorCategory::Retryable => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            code = %error_code,
                            message = %error_message,
                            delay_ms = delay.as_millis(),
                            "Retryable error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(GatewayApiError::MaxRetriesExceeded {
                        attempts: backoff.attempt,
                    });
                }
                ErrorCategory::NonRetryable => {
                    return match status {
                        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                            Err(GatewayApiError::AuthenticationFailed)
                        }
                        StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => {
                            Err(GatewayApiError::Rejected(error_message))
                        }
                        _ => Err(GatewayApiError::Api {
                            code: error_code,
                            message: error_message,
                        }),
                    };
                }
            }
        }
    }
}

/// Error category for determining retry behavior.
enum ErrorCategory {
    RateLimited,
    Retryable,
    NonRetryable,
}

/// Categorize HTTP status code for retry handling.
const fn categorize_status(status: StatusCode) -> ErrorCategory {
    match status.as_u16() {
        429 => ErrorCategory::RateLimited,
        408 | 500 | 502 | 503 | 504 => ErrorCategory::Retryable,
        _ => ErrorCategory::NonRetryable,
    }
}

/// Exponential backoff calculator with jitter.
struct ExponentialBackoff {
    attempt: u32,
    max_attempts: u32,
    current_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
}

impl ExponentialBackoff {
    const fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts,
            current_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
            multiplier: config.multiplier,
        }
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }

        let backoff = self.current_backoff;
        self.current_backoff = Duration::from_secs_f64(
            (self.current_backoff.as_secs_f64() * self.multiplier)
                .min(self.max_backoff.as_secs_f64()),
        );

        // Up to 20% jitter keeps concurrent retries from stampeding.
        let jitter = rand::rng().random_range(0.0..=0.2);
        Some(backoff.mul_f64(1.0 + jitter))
    }
}
