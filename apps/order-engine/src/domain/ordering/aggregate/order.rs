//! Order aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ordering::errors::OrderError;
use crate::domain::ordering::services::OrderStateMachine;
use crate::domain::ordering::value_objects::OrderStatus;
use crate::domain::shared::{CustomerId, Money, OrderId, RestaurantId, TenantId};

use super::line_item::LineItem;

/// Command to create a new order.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    /// Customer placing the order.
    pub customer_id: CustomerId,
    /// Restaurant fulfilling the order.
    pub restaurant_id: RestaurantId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Ordered line items.
    pub line_items: Vec<LineItem>,
    /// Total as computed by the client, if supplied. A mismatch against the
    /// recomputed total is a validation error, never auto-corrected.
    pub declared_total: Option<Money>,
}

/// The Order aggregate root.
///
/// Line items are immutable once the order leaves `PENDING`; afterwards only
/// status transitions are possible, each validated by [`OrderStateMachine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    restaurant_id: RestaurantId,
    tenant_id: TenantId,
    line_items: Vec<LineItem>,
    total: Money,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

impl Order {
    /// Create a new PENDING order.
    ///
    /// # Errors
    ///
    /// Returns error if there are no line items or a declared total does not
    /// equal the sum of line-item subtotals.
    pub fn new(command: CreateOrderCommand) -> Result<Self, OrderError> {
        if command.line_items.is_empty() {
            return Err(OrderError::InvalidParameters {
                field: "line_items".to_string(),
                message: "an order needs at least one line item".to_string(),
            });
        }

        let total: Money = command.line_items.iter().map(LineItem::subtotal).sum();

        if let Some(declared) = command.declared_total {
            if declared != total {
                return Err(OrderError::TotalMismatch {
                    computed: total.to_string(),
                    supplied: declared.to_string(),
                });
            }
        }

        let now = Utc::now();
        Ok(Self {
            id: OrderId::generate(),
            customer_id: command.customer_id,
            restaurant_id: command.restaurant_id,
            tenant_id: command.tenant_id,
            line_items: command.line_items,
            total,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    /// Apply a status transition.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is not valid from the current status.
    pub fn transition(&mut self, to: OrderStatus) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.status, to)?;
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Order ID.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.id
    }

    /// Customer who placed the order.
    #[must_use]
    pub const fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Fulfilling restaurant.
    #[must_use]
    pub const fn restaurant_id(&self) -> &RestaurantId {
        &self.restaurant_id
    }

    /// Owning tenant.
    #[must_use]
    pub const fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Ordered line items.
    #[must_use]
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// Order total, always equal to the sum of line-item subtotals.
    #[must_use]
    pub const fn total(&self) -> Money {
        self.total
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
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
    use crate::domain::shared::MenuItemId;
    use rust_decimal_macros::dec;

    fn two_items() -> Vec<LineItem> {
        vec![
            LineItem::new(MenuItemId::new("item-1"), 1, Money::new(dec!(10.00))).unwrap(),
            LineItem::new(MenuItemId::new("item-2"), 1, Money::new(dec!(5.00))).unwrap(),
        ]
    }

    fn make_order() -> Order {
        Order::new(CreateOrderCommand {
            customer_id: CustomerId::new("cust-1"),
            restaurant_id: RestaurantId::new("rest-1"),
            tenant_id: TenantId::new("tenant-1"),
            line_items: two_items(),
            declared_total: None,
        })
        .unwrap()
    }

    #[test]
    fn new_order_computes_total() {
        let order = make_order();
        assert_eq!(order.total().amount(), dec!(15.00));
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn declared_total_match_accepted() {
        let order = Order::new(CreateOrderCommand {
            customer_id: CustomerId::new("cust-1"),
            restaurant_id: RestaurantId::new("rest-1"),
            tenant_id: TenantId::new("tenant-1"),
            line_items: two_items(),
            declared_total: Some(Money::new(dec!(15.00))),
        });
        assert!(order.is_ok());
    }

    #[test]
    fn declared_total_mismatch_rejected() {
        let result = Order::new(CreateOrderCommand {
            customer_id: CustomerId::new("cust-1"),
            restaurant_id: RestaurantId::new("rest-1"),
            tenant_id: TenantId::new("tenant-1"),
            line_items: two_items(),
            declared_total: Some(Money::new(dec!(12.00))),
        });
        assert!(matches!(result, Err(OrderError::TotalMismatch { .. })));
    }

    #[test]
    fn empty_line_items_rejected() {
        let result = Order::new(CreateOrderCommand {
            customer_id: CustomerId::new("cust-1"),
            restaurant_id: RestaurantId::new("rest-1"),
            tenant_id: TenantId::new("tenant-1"),
            line_items: vec![],
            declared_total: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn transition_through_full_chain() {
        let mut order = make_order();
        order.transition(OrderStatus::Confirmed).unwrap();
        order.transition(OrderStatus::Preparing).unwrap();
        order.transition(OrderStatus::OutForDelivery).unwrap();
        order.transition(OrderStatus::Delivered).unwrap();
        assert_eq!(order.status(), OrderStatus::Delivered);
    }

    #[test]
    fn skipping_a_stage_rejected() {
        let mut order = make_order();
        let result = order.transition(OrderStatus::OutForDelivery);
        assert!(matches!(
            result,
            Err(OrderError::InvalidStateTransition { .. })
        ));
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn transition_from_terminal_rejected() {
        let mut order = make_order();
        order.transition(OrderStatus::Cancelled).unwrap();
        assert!(order.transition(OrderStatus::Confirmed).is_err());
    }

    #[test]
    fn total_stable_across_transitions() {
        let mut order = make_order();
        order.transition(OrderStatus::Confirmed).unwrap();
        let expected: Money = order.line_items().iter().map(LineItem::subtotal).sum();
        assert_eq!(order.total(), expected);
    }
}
