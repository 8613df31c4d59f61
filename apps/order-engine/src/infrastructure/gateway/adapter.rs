//! Payment gateway adapter implementing the application port.

use async_trait::async_trait;

use crate::application::ports::{
    CheckoutSession, GatewayError, PaymentGatewayPort, PaymentIntent, RefundAck,
};
use crate::domain::shared::{Currency, GatewayRef, Money, OrderId};

use super::api_types::{
    CheckoutSessionResponse, CreateCheckoutSessionRequest, CreatePaymentIntentRequest,
    CreateRefundRequest, PaymentIntentResponse, RefundResponse,
};
use super::config::GatewayConfig;
use super::error::GatewayApiError;
use super::http_client::GatewayHttpClient;

/// HTTP adapter for the payment gateway.
pub struct HttpPaymentGateway {
    client: GatewayHttpClient,
}

impl HttpPaymentGateway {
    /// Create the adapter from config.
    ///
    /// # Errors
    ///
    /// Returns error if credentials are missing or the HTTP client cannot
    /// be built.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayApiError> {
        Ok(Self {
            client: GatewayHttpClient::new(config)?,
        })
    }
}

#[async_trait]
impl PaymentGatewayPort for HttpPaymentGateway {
    async fn create_payment_intent(
        &self,
        order_id: &OrderId,
        amount: Money,
        currency: Currency,
    ) -> Result<PaymentIntent, GatewayError> {
        let request = CreatePaymentIntentRequest {
            amount: amount.amount(),
            currency: currency.to_string(),
            order_id: order_id.to_string(),
        };
        let response: PaymentIntentResponse = self
            .client
            .post("/v1/payment_intents", &request)
            .await
            .map_err(GatewayError::from)?;
        Ok(PaymentIntent {
            gateway_ref: GatewayRef::new(response.id),
            client_secret: response.client_secret,
        })
    }

    async fn create_checkout_session(
        &self,
        order_id: &OrderId,
        amount: Money,
        currency: Currency,
    ) -> Result<CheckoutSession, GatewayError> {
        let request = CreateCheckoutSessionRequest {
            amount: amount.amount(),
            currency: currency.to_string(),
            order_id: order_id.to_string(),
        };
        let response: CheckoutSessionResponse = self
            .client
            .post("/v1/checkout_sessions", &request)
            .await
            .map_err(GatewayError::from)?;
        Ok(CheckoutSession {
            gateway_ref: GatewayRef::new(response.id),
            redirect_url: response.url,
        })
    }

    async fn create_refund(
        &self,
        payment_ref: &GatewayRef,
        amount: Money,
    ) -> Result<RefundAck, GatewayError> {
        let request = CreateRefundRequest {
            payment: payment_ref.to_string(),
            amount: amount.amount(),
        };
        let response: RefundResponse = self
            .client
            .post("/v1/refunds", &request)
            .await
            .map_err(GatewayError::from)?;
        Ok(RefundAck {
            refund_ref: GatewayRef::new(response.id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::gateway::config::RetryConfig;
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> GatewayConfig {
        GatewayConfig::new(
            server.uri(),
            "sk_test".to_string(),
            "whsec_test".to_string(),
        )
        .with_timeout(Duration::from_secs(2))
        .with_retry(RetryConfig {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(50),
            multiplier: 2.0,
        })
    }

    #[tokio::test]
    async fn payment_intent_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .and(body_partial_json(serde_json::json!({
                "amount": "15.00",
                "currency": "USD",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pi_123",
                "client_secret": "cs_secret",
            })))
            .mount(&server)
            .await;

        let adapter = HttpPaymentGateway::new(&config(&server)).unwrap();
        let intent = adapter
            .create_payment_intent(&OrderId::new("ord-1"), Money::new(dec!(15.00)), Currency::Usd)
            .await
            .unwrap();

        assert_eq!(intent.gateway_ref.as_str(), "pi_123");
        assert_eq!(intent.client_secret, "cs_secret");
    }

    #[tokio::test]
    async fn retries_on_service_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout_sessions"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout_sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_123",
                "url": "https://gateway.test/pay/cs_123",
            })))
            .mount(&server)
            .await;

        let adapter = HttpPaymentGateway::new(&config(&server)).unwrap();
        let session = adapter
            .create_checkout_session(
                &OrderId::new("ord-1"),
                Money::new(dec!(15.00)),
                Currency::Usd,
            )
            .await
            .unwrap();

        assert_eq!(session.gateway_ref.as_str(), "cs_123");
    }

    #[tokio::test]
    async fn rejection_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "code": "amount_too_small",
                "message": "Amount below minimum",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = HttpPaymentGateway::new(&config(&server)).unwrap();
        let err = adapter
            .create_payment_intent(&OrderId::new("ord-1"), Money::new(dec!(0.01)), Currency::Usd)
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Rejected(_)));
    }

    #[tokio::test]
    async fn exhausted_retries_surface_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/refunds"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let adapter = HttpPaymentGateway::new(&config(&server)).unwrap();
        let err = adapter
            .create_refund(&GatewayRef::new("pi_123"), Money::new(dec!(15.00)))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Unavailable(_)));
    }

    #[tokio::test]
    async fn authentication_failure_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/refunds"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let adapter = HttpPaymentGateway::new(&config(&server)).unwrap();
        let err = adapter
            .create_refund(&GatewayRef::new("pi_123"), Money::new(dec!(15.00)))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Authentication));
    }
}
