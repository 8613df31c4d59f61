//! Cancellation DTOs crossing the API boundary.

use serde::{Deserialize, Serialize};

use crate::domain::cancellation::aggregate::OrderCancellation;
use crate::domain::cancellation::value_objects::{CancellationStatus, RefundStatus};
use crate::domain::shared::{ActorId, CancellationId, CustomerId, OrderId, RestaurantId};

/// Request body for requesting a cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCancellationRequest {
    /// Order to cancel.
    pub order_id: OrderId,
    /// Free-text reason.
    pub reason: String,
}

/// Request body for updating a cancellation's reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCancellationRequest {
    /// New reason.
    pub reason: String,
}

/// A cancellation as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationDto {
    /// Cancellation id.
    pub id: CancellationId,
    /// Cancelled order.
    pub order_id: OrderId,
    /// Customer of the cancelled order.
    pub customer_id: CustomerId,
    /// Restaurant of the cancelled order.
    pub restaurant_id: RestaurantId,
    /// Actor who requested the cancellation.
    pub requested_by: ActorId,
    /// Free-text reason.
    pub reason: String,
    /// Status.
    pub status: CancellationStatus,
    /// Refund status.
    pub refund_status: RefundStatus,
}

impl CancellationDto {
    /// Build the DTO from a domain cancellation.
    #[must_use]
    pub fn from_cancellation(cancellation: &OrderCancellation) -> Self {
        Self {
            id: cancellation.id().clone(),
            order_id: cancellation.order_id().clone(),
            customer_id: cancellation.customer_id().clone(),
            restaurant_id: cancellation.restaurant_id().clone(),
            requested_by: cancellation.requested_by().clone(),
            reason: cancellation.reason().to_string(),
            status: cancellation.status(),
            refund_status: cancellation.refund_status(),
        }
    }
}
