//! OrderCancellation aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::cancellation::errors::CancellationError;
use crate::domain::cancellation::value_objects::{CancellationStatus, RefundStatus};
use crate::domain::shared::{ActorId, CancellationId, CustomerId, OrderId, RestaurantId};

/// The OrderCancellation aggregate root.
///
/// Created at most once per cancelled order; its refund status mirrors and
/// gates the associated payment's refund lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancellation {
    id: CancellationId,
    order_id: OrderId,
    customer_id: CustomerId,
    restaurant_id: RestaurantId,
    requested_by: ActorId,
    reason: String,
    status: CancellationStatus,
    refund_status: RefundStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

impl OrderCancellation {
    /// Record a cancellation with no refund needed; immediately COMPLETED.
    ///
    /// # Errors
    ///
    /// Returns error if the reason is empty.
    pub fn without_refund(
        order_id: OrderId,
        customer_id: CustomerId,
        restaurant_id: RestaurantId,
        requested_by: ActorId,
        reason: String,
    ) -> Result<Self, CancellationError> {
        Self::create(
            order_id,
            customer_id,
            restaurant_id,
            requested_by,
            reason,
            CancellationStatus::Completed,
            RefundStatus::NotRequired,
        )
    }

    /// Record a cancellation with a refund requested from the gateway;
    /// stays PROCESSING until the refund settles.
    ///
    /// # Errors
    ///
    /// Returns error if the reason is empty.
    pub fn with_refund_requested(
        order_id: OrderId,
        customer_id: CustomerId,
        restaurant_id: RestaurantId,
        requested_by: ActorId,
        reason: String,
    ) -> Result<Self, CancellationError> {
        Self::create(
            order_id,
            customer_id,
            restaurant_id,
            requested_by,
            reason,
            CancellationStatus::Processing,
            RefundStatus::Requested,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn create(
        order_id: OrderId,
        customer_id: CustomerId,
        restaurant_id: RestaurantId,
        requested_by: ActorId,
        reason: String,
        status: CancellationStatus,
        refund_status: RefundStatus,
    ) -> Result<Self, CancellationError> {
        validate_reason(&reason)?;
        let now = Utc::now();
        Ok(Self {
            id: CancellationId::generate(),
            order_id,
            customer_id,
            restaurant_id,
            requested_by,
            reason,
            status,
            refund_status,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    /// Settle the refund from a gateway event.
    ///
    /// A completed refund also completes the cancellation; a failed refund
    /// leaves it PROCESSING for operator attention. Settling an
    /// already-settled refund is a no-op, reported via the returned flag.
    pub fn settle_refund(&mut self, succeeded: bool) -> bool {
        if self.refund_status != RefundStatus::Requested {
            return false;
        }
        if succeeded {
            self.refund_status = RefundStatus::Completed;
            self.status = CancellationStatus::Completed;
        } else {
            self.refund_status = RefundStatus::Failed;
        }
        self.updated_at = Utc::now();
        true
    }

    /// Replace the free-text reason.
    ///
    /// # Errors
    ///
    /// Returns error if the new reason is empty.
    pub fn update_reason(&mut self, reason: String) -> Result<(), CancellationError> {
        validate_reason(&reason)?;
        self.reason = reason;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Cancellation ID.
    #[must_use]
    pub const fn id(&self) -> &CancellationId {
        &self.id
    }

    /// Cancelled order.
    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Customer of the cancelled order.
    #[must_use]
    pub const fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Restaurant of the cancelled order.
    #[must_use]
    pub const fn restaurant_id(&self) -> &RestaurantId {
        &self.restaurant_id
    }

    /// Actor who requested the cancellation.
    #[must_use]
    pub const fn requested_by(&self) -> &ActorId {
        &self.requested_by
    }

    /// Free-text reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> CancellationStatus {
        self.status
    }

    /// Refund status.
    #[must_use]
    pub const fn refund_status(&self) -> RefundStatus {
        self.refund_status
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

fn validate_reason(reason: &str) -> Result<(), CancellationError> {
    if reason.trim().is_empty() {
        return Err(CancellationError::InvalidParameters {
            field: "reason".to_string(),
            message: "reason cannot be empty".to_string(),
        });
    }
    Ok(())
}
