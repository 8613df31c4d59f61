//! Payment aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::payment::errors::PaymentError;
use crate::domain::payment::value_objects::PaymentStatus;
use crate::domain::shared::{Currency, EventId, GatewayRef, Money, OrderId, PaymentId};

/// Outcome of applying a gateway event to a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventApplication {
    /// The event moved the payment to a new status.
    Applied(PaymentStatus),
    /// This exact event id was already processed; nothing changed.
    Duplicate,
    /// The payment was already terminal; the redelivery was recorded but
    /// had no effect.
    Ignored,
}

/// The Payment aggregate root.
///
/// A payment is keyed by the gateway's reference and remembers every gateway
/// event id it has applied, so at-least-once webhook delivery is safe to
/// replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    id: PaymentId,
    order_id: OrderId,
    amount: Money,
    currency: Currency,
    status: PaymentStatus,
    gateway_ref: GatewayRef,
    processed_events: Vec<EventId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

impl Payment {
    /// Create a new PENDING payment for a gateway object.
    ///
    /// # Errors
    ///
    /// Returns error if the amount is not positive.
    pub fn new(
        order_id: OrderId,
        amount: Money,
        currency: Currency,
        gateway_ref: GatewayRef,
    ) -> Result<Self, PaymentError> {
        if !amount.is_positive() {
            return Err(PaymentError::InvalidParameters {
                field: "amount".to_string(),
                message: "payment amount must be positive".to_string(),
            });
        }
        let now = Utc::now();
        Ok(Self {
            id: PaymentId::generate(),
            order_id,
            amount,
            currency,
            status: PaymentStatus::Pending,
            gateway_ref,
            processed_events: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    /// Apply a gateway event carrying a terminal outcome.
    ///
    /// Replays of an already-processed event id are detected first; a
    /// redelivered terminal outcome against an already-terminal payment is
    /// recorded but applies nothing. Only `PENDING -> SUCCEEDED` and
    /// `PENDING -> FAILED` change state.
    pub fn apply_event(&mut self, event_id: EventId, outcome: PaymentStatus) -> EventApplication {
        if !self.record_event(event_id) {
            return EventApplication::Duplicate;
        }

        if self.status.is_terminal() || !outcome.is_terminal() {
            return EventApplication::Ignored;
        }

        self.status = outcome;
        EventApplication::Applied(outcome)
    }

    /// Record a gateway event id without touching payment status (used for
    /// refund events, which settle the cancellation instead).
    ///
    /// Returns false when the event id was already recorded.
    pub fn record_event(&mut self, event_id: EventId) -> bool {
        if self.processed_events.contains(&event_id) {
            return false;
        }
        self.processed_events.push(event_id);
        self.updated_at = Utc::now();
        true
    }

    /// Whether this exact event id has already been applied.
    #[must_use]
    pub fn has_processed(&self, event_id: &EventId) -> bool {
        self.processed_events.contains(event_id)
    }

    /// Payment ID.
    #[must_use]
    pub const fn id(&self) -> &PaymentId {
        &self.id
    }

    /// Parent order.
    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Settled or reserved amount.
    #[must_use]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    /// Currency of the amount.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Gateway reference for the remote payment object.
    #[must_use]
    pub const fn gateway_ref(&self) -> &GatewayRef {
        &self.gateway_ref
    }

    /// Every gateway event id applied so far.
    #[must_use]
    pub fn processed_events(&self) -> &[EventId] {
        &self.processed_events
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Version counter used for conditional writes.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Set the version counter. Called by persistence adapters only.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_payment() -> Payment {
        Payment::new(
            OrderId::new("ord-1"),
            Money::new(dec!(15.00)),
            Currency::Usd,
            GatewayRef::new("pi_123"),
        )
        .unwrap()
    }

    #[test]
    fn new_payment_is_pending() {
        let payment = make_payment();
        assert_eq!(payment.status(), PaymentStatus::Pending);
        assert!(payment.processed_events().is_empty());
    }

    #[test]
    fn non_positive_amount_rejected() {
        let result = Payment::new(
            OrderId::new("ord-1"),
            Money::ZERO,
            Currency::Usd,
            GatewayRef::new("pi_123"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn succeeded_event_applies_once() {
        let mut payment = make_payment();

        let first = payment.apply_event(EventId::new("evt-1"), PaymentStatus::Succeeded);
        assert_eq!(first, EventApplication::Applied(PaymentStatus::Succeeded));
        assert_eq!(payment.status(), PaymentStatus::Succeeded);

        let replay = payment.apply_event(EventId::new("evt-1"), PaymentStatus::Succeeded);
        assert_eq!(replay, EventApplication::Duplicate);
        assert_eq!(payment.status(), PaymentStatus::Succeeded);
    }

    #[test]
    fn terminal_redelivery_with_new_event_id_is_ignored() {
        let mut payment = make_payment();
        payment.apply_event(EventId::new("evt-1"), PaymentStatus::Succeeded);

        // Gateways may redeliver terminal outcomes under fresh event ids.
        let second = payment.apply_event(EventId::new("evt-2"), PaymentStatus::Failed);
        assert_eq!(second, EventApplication::Ignored);
        assert_eq!(payment.status(), PaymentStatus::Succeeded);
        assert!(payment.has_processed(&EventId::new("evt-2")));
    }

    #[test]
    fn failed_event_applies() {
        let mut payment = make_payment();
        let outcome = payment.apply_event(EventId::new("evt-1"), PaymentStatus::Failed);
        assert_eq!(outcome, EventApplication::Applied(PaymentStatus::Failed));
        assert_eq!(payment.status(), PaymentStatus::Failed);
    }

    #[test]
    fn pending_outcome_never_applies() {
        let mut payment = make_payment();
        let outcome = payment.apply_event(EventId::new("evt-1"), PaymentStatus::Pending);
        assert_eq!(outcome, EventApplication::Ignored);
        assert_eq!(payment.status(), PaymentStatus::Pending);
    }

    #[test]
    fn idempotence_applying_same_event_twice_is_stable() {
        let mut a = make_payment();
        a.apply_event(EventId::new("evt-1"), PaymentStatus::Succeeded);
        let mut b = a.clone();

        a.apply_event(EventId::new("evt-1"), PaymentStatus::Succeeded);
        b.apply_event(EventId::new("evt-1"), PaymentStatus::Succeeded);
        assert_eq!(a.status(), b.status());
        assert_eq!(a.processed_events().len(), b.processed_events().len());
    }
}
