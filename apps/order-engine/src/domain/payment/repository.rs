//! Payment Repository Trait

use async_trait::async_trait;

use super::aggregate::Payment;
use super::errors::PaymentError;
use crate::domain::shared::{GatewayRef, OrderId, PaymentId};

/// Repository trait for Payment persistence.
///
/// Mutations are compare-and-swap on the aggregate version; webhook
/// reconciliation depends on this to stay correct under concurrent
/// redelivery.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Insert a new payment.
    ///
    /// # Errors
    ///
    /// Returns error if persistence fails.
    async fn insert(&self, payment: &Payment) -> Result<Payment, PaymentError>;

    /// Find a payment by its ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, PaymentError>;

    /// Find a payment by the gateway's reference.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_gateway_ref(
        &self,
        gateway_ref: &GatewayRef,
    ) -> Result<Option<Payment>, PaymentError>;

    /// All payments recorded for an order.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_order(&self, order_id: &OrderId) -> Result<Vec<Payment>, PaymentError>;

    /// Conditionally update a payment.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::VersionConflict`] when a concurrent write won
    /// the race, [`PaymentError::NotFound`] when the payment does not exist.
    async fn update(
        &self,
        payment: &Payment,
        expected_version: u64,
    ) -> Result<Payment, PaymentError>;
}
