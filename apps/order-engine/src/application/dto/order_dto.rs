//! Order DTOs crossing the API boundary.

use serde::{Deserialize, Serialize};

use crate::domain::ordering::aggregate::Order;
use crate::domain::ordering::value_objects::OrderStatus;
use crate::domain::shared::{CustomerId, MenuItemId, Money, OrderId, RestaurantId, TenantId};

/// A line item as supplied by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineItemDto {
    /// Referenced menu item.
    pub menu_item_id: MenuItemId,
    /// Quantity ordered.
    pub quantity: u32,
    /// Unit price the client saw; must match the catalog.
    pub unit_price: Money,
}

/// Request body for creating an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderRequest {
    /// Restaurant the order is placed with.
    pub restaurant_id: RestaurantId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Ordered items.
    pub line_items: Vec<LineItemDto>,
    /// Client-computed total, verified against the recomputed total.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Money>,
}

/// Request body for updating an order's status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderRequest {
    /// Target status.
    pub status: OrderStatus,
}

/// An order as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDto {
    /// Order id.
    pub id: OrderId,
    /// Customer who placed the order.
    pub customer_id: CustomerId,
    /// Fulfilling restaurant.
    pub restaurant_id: RestaurantId,
    /// Line items.
    pub line_items: Vec<LineItemDto>,
    /// Order total.
    pub total: Money,
    /// Current status.
    pub status: OrderStatus,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last update timestamp (RFC 3339).
    pub updated_at: String,
}

impl OrderDto {
    /// Build the DTO from a domain order.
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        Self {
            id: order.id().clone(),
            customer_id: order.customer_id().clone(),
            restaurant_id: order.restaurant_id().clone(),
            line_items: order
                .line_items()
                .iter()
                .map(|item| LineItemDto {
                    menu_item_id: item.menu_item_id().clone(),
                    quantity: item.quantity(),
                    unit_price: item.unit_price(),
                })
                .collect(),
            total: order.total(),
            status: order.status(),
            created_at: order.created_at().to_rfc3339(),
            updated_at: order.updated_at().to_rfc3339(),
        }
    }
}
