//! Payment gateway adapter configuration.

use std::time::Duration;

/// Configuration for the payment gateway adapter.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway API.
    pub base_url: String,
    /// Secret API key sent as a bearer token.
    pub api_key: String,
    /// Secret used to verify webhook signatures.
    pub webhook_secret: String,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Retry policy configuration.
    pub retry: RetryConfig,
}

impl GatewayConfig {
    /// Create a new configuration with default timeout and retries.
    #[must_use]
    pub fn new(base_url: String, api_key: String, webhook_secret: String) -> Self {
        Self {
            base_url,
            api_key,
            webhook_secret,
            timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
        }
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}
