//! Closed query specifications for cancellation list endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::cancellation::aggregate::OrderCancellation;
use crate::domain::cancellation::value_objects::CancellationStatus;
use crate::domain::shared::{CustomerId, OrderId, RestaurantId};

/// Caller-supplied filter for listing cancellations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CancellationFilter {
    /// Restrict to a parent order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    /// Restrict to a customer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    /// Restrict to a restaurant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<RestaurantId>,
    /// Restrict to a status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CancellationStatus>,
}

/// Effective cancellation query after authorization narrowing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancellationQuery {
    /// Restrict to a parent order.
    pub order_id: Option<OrderId>,
    /// Restrict to a customer.
    pub customer_id: Option<CustomerId>,
    /// Restrict to any of these restaurants.
    pub restaurant_ids: Option<Vec<RestaurantId>>,
    /// Restrict to a status.
    pub status: Option<CancellationStatus>,
}

impl CancellationQuery {
    /// Whether a cancellation satisfies every constraint of this query.
    #[must_use]
    pub fn matches(&self, cancellation: &OrderCancellation) -> bool {
        if let Some(order_id) = &self.order_id {
            if cancellation.order_id() != order_id {
                return false;
            }
        }
        if let Some(customer_id) = &self.customer_id {
            if cancellation.customer_id() != customer_id {
                return false;
            }
        }
        if let Some(restaurant_ids) = &self.restaurant_ids {
            if !restaurant_ids.contains(cancellation.restaurant_id()) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if cancellation.status() != status {
                return false;
            }
        }
        true
    }
}
