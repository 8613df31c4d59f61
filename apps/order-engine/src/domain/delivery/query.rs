//! Closed query specifications for delivery list endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::delivery::aggregate::Delivery;
use crate::domain::delivery::value_objects::DeliveryStatus;
use crate::domain::shared::{CustomerId, DriverId, OrderId, RestaurantId};

/// Caller-supplied filter for listing deliveries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryFilter {
    /// Restrict to a parent order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    /// Restrict to a customer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    /// Restrict to a restaurant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<RestaurantId>,
    /// Restrict to a driver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<DriverId>,
    /// Restrict to a status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeliveryStatus>,
}

/// Effective delivery query after authorization narrowing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryQuery {
    /// Restrict to a parent order.
    pub order_id: Option<OrderId>,
    /// Restrict to a customer.
    pub customer_id: Option<CustomerId>,
    /// Restrict to any of these restaurants.
    pub restaurant_ids: Option<Vec<RestaurantId>>,
    /// Restrict to a driver.
    pub driver_id: Option<DriverId>,
    /// Restrict to a status.
    pub status: Option<DeliveryStatus>,
}

impl DeliveryQuery {
    /// Whether a delivery satisfies every constraint of this query.
    #[must_use]
    pub fn matches(&self, delivery: &Delivery) -> bool {
        if let Some(order_id) = &self.order_id {
            if delivery.order_id() != order_id {
                return false;
            }
        }
        if let Some(customer_id) = &self.customer_id {
            if delivery.customer_id() != customer_id {
                return false;
            }
        }
        if let Some(restaurant_ids) = &self.restaurant_ids {
            if !restaurant_ids.contains(delivery.restaurant_id()) {
                return false;
            }
        }
        if let Some(driver_id) = &self.driver_id {
            if delivery.driver_id() != Some(driver_id) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if delivery.status() != status {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_delivery() -> Delivery {
        Delivery::new(
            OrderId::new("ord-1"),
            CustomerId::new("cust-1"),
            RestaurantId::new("rest-1"),
        )
    }

    #[test]
    fn driver_constraint_excludes_unassigned() {
        let query = DeliveryQuery {
            driver_id: Some(DriverId::new("drv-1")),
            ..Default::default()
        };
        assert!(!query.matches(&make_delivery()));
    }

    #[test]
    fn driver_constraint_matches_assignee() {
        let mut delivery = make_delivery();
        delivery.assign(DriverId::new("drv-1")).unwrap();

        let query = DeliveryQuery {
            driver_id: Some(DriverId::new("drv-1")),
            ..Default::default()
        };
        assert!(query.matches(&delivery));
    }

    #[test]
    fn restaurant_set_constraint_applies() {
        let query = DeliveryQuery {
            restaurant_ids: Some(vec![RestaurantId::new("rest-2")]),
            ..Default::default()
        };
        assert!(!query.matches(&make_delivery()));
    }
}
