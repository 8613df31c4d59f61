//! Closed query specifications for order list endpoints.
//!
//! The caller-supplied [`OrderFilter`] is a closed struct: unknown keys are
//! rejected at deserialization and ownership constraints are injected by the
//! authorization engine, producing an [`OrderQuery`] the repository executes.

use serde::{Deserialize, Serialize};

use crate::domain::ordering::aggregate::Order;
use crate::domain::ordering::value_objects::OrderStatus;
use crate::domain::shared::{CustomerId, RestaurantId};

/// Caller-supplied filter for listing orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderFilter {
    /// Restrict to a customer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    /// Restrict to a restaurant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<RestaurantId>,
    /// Restrict to a status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

/// Effective order query after authorization narrowing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    /// Restrict to a customer.
    pub customer_id: Option<CustomerId>,
    /// Restrict to any of these restaurants.
    pub restaurant_ids: Option<Vec<RestaurantId>>,
    /// Restrict to a status.
    pub status: Option<OrderStatus>,
}

impl OrderQuery {
    /// Whether an order satisfies every constraint of this query.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(customer_id) = &self.customer_id {
            if order.customer_id() != customer_id {
                return false;
            }
        }
        if let Some(restaurant_ids) = &self.restaurant_ids {
            if !restaurant_ids.contains(order.restaurant_id()) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if order.status() != status {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ordering::aggregate::{CreateOrderCommand, LineItem};
    use crate::domain::shared::{MenuItemId, Money, TenantId};
    use rust_decimal_macros::dec;

    fn order_for(customer: &str, restaurant: &str) -> Order {
        Order::new(CreateOrderCommand {
            customer_id: CustomerId::new(customer),
            restaurant_id: RestaurantId::new(restaurant),
            tenant_id: TenantId::new("tenant-1"),
            line_items: vec![
                LineItem::new(MenuItemId::new("item-1"), 1, Money::new(dec!(10.00))).unwrap(),
            ],
            declared_total: None,
        })
        .unwrap()
    }

    #[test]
    fn empty_query_matches_everything() {
        let query = OrderQuery::default();
        assert!(query.matches(&order_for("cust-1", "rest-1")));
    }

    #[test]
    fn customer_constraint_applies() {
        let query = OrderQuery {
            customer_id: Some(CustomerId::new("cust-1")),
            ..Default::default()
        };
        assert!(query.matches(&order_for("cust-1", "rest-1")));
        assert!(!query.matches(&order_for("cust-2", "rest-1")));
    }

    #[test]
    fn restaurant_set_constraint_applies() {
        let query = OrderQuery {
            restaurant_ids: Some(vec![RestaurantId::new("rest-1"), RestaurantId::new("rest-2")]),
            ..Default::default()
        };
        assert!(query.matches(&order_for("cust-1", "rest-2")));
        assert!(!query.matches(&order_for("cust-1", "rest-3")));
    }

    #[test]
    fn status_constraint_applies() {
        let query = OrderQuery {
            status: Some(OrderStatus::Confirmed),
            ..Default::default()
        };
        assert!(!query.matches(&order_for("cust-1", "rest-1")));
    }

    #[test]
    fn filter_rejects_unknown_fields() {
        let result: Result<OrderFilter, _> =
            serde_json::from_str(r#"{"customer_id": "c", "sort": "sneaky"}"#);
        assert!(result.is_err());
    }
}
