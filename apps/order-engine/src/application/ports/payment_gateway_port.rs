//! Payment gateway port.
//!
//! Interface for the external payment gateway. Implemented by the HTTP
//! adapter in the infrastructure layer; tests supply mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::shared::{Currency, EventId, GatewayRef, Money, OrderId};

/// Gateway-side payment intent, returned from initiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    /// Gateway reference for the created object.
    pub gateway_ref: GatewayRef,
    /// Client secret the frontend uses to finish the payment.
    pub client_secret: String,
}

/// Gateway-side hosted checkout session, returned from initiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Gateway reference for the created object.
    pub gateway_ref: GatewayRef,
    /// Hosted page the customer is redirected to.
    pub redirect_url: String,
}

/// Acknowledgement of a refund request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundAck {
    /// Gateway reference for the refund object.
    pub refund_ref: GatewayRef,
}

/// Kind of a gateway webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayEventKind {
    /// The payment settled.
    PaymentSucceeded,
    /// The payment failed.
    PaymentFailed,
    /// A refund completed.
    RefundCompleted,
    /// A refund failed.
    RefundFailed,
}

/// A signature-verified, parsed webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayEvent {
    /// The gateway's unique event id (idempotency key).
    pub id: EventId,
    /// What happened.
    pub kind: GatewayEventKind,
    /// Gateway reference of the payment the event concerns. Refund events
    /// carry the reference of the refunded payment.
    pub payment_ref: GatewayRef,
}

/// Errors surfaced by the gateway port.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The call did not complete within the bounded timeout/retries.
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
    /// The gateway rejected the request.
    #[error("gateway rejected the request: {0}")]
    Rejected(String),
    /// Credentials were refused.
    #[error("gateway authentication failed")]
    Authentication,
    /// Response could not be understood.
    #[error("gateway protocol error: {0}")]
    Protocol(String),
}

/// Port to the external payment gateway.
#[async_trait]
pub trait PaymentGatewayPort: Send + Sync {
    /// Create a payment intent for the given amount.
    ///
    /// # Errors
    ///
    /// Returns error if the gateway is unreachable after bounded retries or
    /// rejects the request.
    async fn create_payment_intent(
        &self,
        order_id: &OrderId,
        amount: Money,
        currency: Currency,
    ) -> Result<PaymentIntent, GatewayError>;

    /// Create a hosted checkout session for the given amount.
    ///
    /// # Errors
    ///
    /// Returns error if the gateway is unreachable after bounded retries or
    /// rejects the request.
    async fn create_checkout_session(
        &self,
        order_id: &OrderId,
        amount: Money,
        currency: Currency,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Request a refund of a settled payment.
    ///
    /// # Errors
    ///
    /// Returns error if the gateway is unreachable after bounded retries or
    /// rejects the request.
    async fn create_refund(
        &self,
        payment_ref: &GatewayRef,
        amount: Money,
    ) -> Result<RefundAck, GatewayError>;
}
