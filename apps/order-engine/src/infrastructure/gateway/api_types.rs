//! Wire types for the payment gateway API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::ports::{GatewayEvent, GatewayEventKind};
use crate::domain::shared::{EventId, GatewayRef};

/// Request body for creating a payment intent.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePaymentIntentRequest {
    /// Amount in major units.
    pub amount: Decimal,
    /// ISO currency code.
    pub currency: String,
    /// Local order id, echoed back in events.
    pub order_id: String,
}

/// Gateway response for a created payment intent.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntentResponse {
    /// Gateway object id.
    pub id: String,
    /// Client secret for the frontend.
    pub client_secret: String,
}

/// Request body for creating a hosted checkout session.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCheckoutSessionRequest {
    /// Amount in major units.
    pub amount: Decimal,
    /// ISO currency code.
    pub currency: String,
    /// Local order id, echoed back in events.
    pub order_id: String,
}

/// Gateway response for a created checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionResponse {
    /// Gateway object id.
    pub id: String,
    /// Hosted page URL.
    pub url: String,
}

/// Request body for creating a refund.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRefundRequest {
    /// Gateway reference of the payment to refund.
    pub payment: String,
    /// Amount in major units.
    pub amount: Decimal,
}

/// Gateway response for a created refund.
#[derive(Debug, Clone, Deserialize)]
pub struct RefundResponse {
    /// Gateway refund id.
    pub id: String,
}

/// Error body returned by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayErrorResponse {
    /// Error code, if supplied.
    pub code: Option<String>,
    /// Error message.
    pub message: String,
}

/// Raw webhook event envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    /// Gateway event id.
    pub id: String,
    /// Event type string, e.g. `payment.succeeded`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload.
    pub data: WebhookData,
}

/// Webhook payload wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookData {
    /// The object the event concerns.
    pub object: WebhookObject,
}

/// The gateway object carried by a webhook event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookObject {
    /// Gateway object id (payment reference for payment events, refund id
    /// for refund events).
    pub id: String,
    /// For refund events, the reference of the refunded payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<String>,
}

impl WebhookEnvelope {
    /// Map the wire envelope to a domain-facing event.
    ///
    /// Returns None for event types this engine does not consume; such
    /// events are acknowledged without effect.
    #[must_use]
    pub fn into_event(self) -> Option<GatewayEvent> {
        let kind = match self.event_type.as_str() {
            "payment.succeeded" => GatewayEventKind::PaymentSucceeded,
            "payment.failed" => GatewayEventKind::PaymentFailed,
            "refund.completed" => GatewayEventKind::RefundCompleted,
            "refund.failed" => GatewayEventKind::RefundFailed,
            _ => return None,
        };
        let payment_ref = match kind {
            GatewayEventKind::RefundCompleted | GatewayEventKind::RefundFailed => {
                self.data.object.payment?
            }
            GatewayEventKind::PaymentSucceeded | GatewayEventKind::PaymentFailed => {
                self.data.object.id
            }
        };
        Some(GatewayEvent {
            id: EventId::new(self.id),
            kind,
            payment_ref: GatewayRef::new(payment_ref),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(event_type: &str, object_id: &str, payment: Option<&str>) -> WebhookEnvelope {
        WebhookEnvelope {
            id: "evt-1".to_string(),
            event_type: event_type.to_string(),
            data: WebhookData {
                object: WebhookObject {
                    id: object_id.to_string(),
                    payment: payment.map(String::from),
                },
            },
        }
    }

    #[test]
    fn payment_event_uses_object_id() {
        let event = envelope("payment.succeeded", "pi_123", None)
            .into_event()
            .unwrap();
        assert_eq!(event.kind, GatewayEventKind::PaymentSucceeded);
        assert_eq!(event.payment_ref.as_str(), "pi_123");
    }

    #[test]
    fn refund_event_uses_payment_reference() {
        let event = envelope("refund.completed", "re_9", Some("pi_123"))
            .into_event()
            .unwrap();
        assert_eq!(event.kind, GatewayEventKind::RefundCompleted);
        assert_eq!(event.payment_ref.as_str(), "pi_123");
    }

    #[test]
    fn refund_event_without_payment_reference_is_dropped() {
        assert!(envelope("refund.failed", "re_9", None).into_event().is_none());
    }

    #[test]
    fn unknown_event_type_is_dropped() {
        assert!(
            envelope("customer.created", "cus_1", None)
                .into_event()
                .is_none()
        );
    }

    #[test]
    fn envelope_parses_wire_json() {
        let json = r#"{
            "id": "evt-42",
            "type": "payment.failed",
            "data": { "object": { "id": "pi_7" } }
        }"#;
        let envelope: WebhookEnvelope = serde_json::from_str(json).unwrap();
        let event = envelope.into_event().unwrap();
        assert_eq!(event.id.as_str(), "evt-42");
        assert_eq!(event.kind, GatewayEventKind::PaymentFailed);
    }
}
