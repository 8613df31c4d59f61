//! Payment DTOs crossing the API boundary.

use serde::{Deserialize, Serialize};

use crate::domain::payment::aggregate::Payment;
use crate::domain::payment::value_objects::PaymentStatus;
use crate::domain::shared::{Currency, GatewayRef, Money, OrderId, PaymentId};

/// Response for a created payment intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentDto {
    /// Local payment id.
    pub payment_id: PaymentId,
    /// Parent order.
    pub order_id: OrderId,
    /// Gateway reference.
    pub gateway_ref: GatewayRef,
    /// Client secret for the frontend.
    pub client_secret: String,
    /// Amount charged (the order's outstanding balance).
    pub amount: Money,
    /// Currency of the amount.
    pub currency: Currency,
    /// Payment status after creation.
    pub status: PaymentStatus,
}

/// Response for a created checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionDto {
    /// Local payment id.
    pub payment_id: PaymentId,
    /// Parent order.
    pub order_id: OrderId,
    /// Gateway reference.
    pub gateway_ref: GatewayRef,
    /// Hosted page to redirect the customer to.
    pub redirect_url: String,
    /// Amount charged (the order's outstanding balance).
    pub amount: Money,
    /// Currency of the amount.
    pub currency: Currency,
    /// Payment status after creation.
    pub status: PaymentStatus,
}

/// A payment as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDto {
    /// Payment id.
    pub id: PaymentId,
    /// Parent order.
    pub order_id: OrderId,
    /// Amount.
    pub amount: Money,
    /// Currency.
    pub currency: Currency,
    /// Status.
    pub status: PaymentStatus,
    /// Gateway reference.
    pub gateway_ref: GatewayRef,
}

impl PaymentDto {
    /// Build the DTO from a domain payment.
    #[must_use]
    pub fn from_payment(payment: &Payment) -> Self {
        Self {
            id: payment.id().clone(),
            order_id: payment.order_id().clone(),
            amount: payment.amount(),
            currency: payment.currency(),
            status: payment.status(),
            gateway_ref: payment.gateway_ref().clone(),
        }
    }
}
