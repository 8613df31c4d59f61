//! Order line items.

use serde::{Deserialize, Serialize};

use crate::domain::ordering::errors::OrderError;
use crate::domain::shared::{MenuItemId, Money};

/// A single line of an order: a menu item, a quantity and the unit price
/// captured at ordering time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    menu_item_id: MenuItemId,
    quantity: u32,
    unit_price: Money,
}

impl LineItem {
    /// Create a line item.
    ///
    /// # Errors
    ///
    /// Returns error if the quantity is zero or the unit price is negative.
    pub fn new(
        menu_item_id: MenuItemId,
        quantity: u32,
        unit_price: Money,
    ) -> Result<Self, OrderError> {
        if quantity == 0 {
            return Err(OrderError::InvalidParameters {
                field: "quantity".to_string(),
                message: "quantity must be at least 1".to_string(),
            });
        }
        if unit_price.is_negative() {
            return Err(OrderError::InvalidParameters {
                field: "unit_price".to_string(),
                message: "unit price cannot be negative".to_string(),
            });
        }
        Ok(Self {
            menu_item_id,
            quantity,
            unit_price,
        })
    }

    /// The referenced menu item.
    #[must_use]
    pub const fn menu_item_id(&self) -> &MenuItemId {
        &self.menu_item_id
    }

    /// Ordered quantity.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price at ordering time.
    #[must_use]
    pub const fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// quantity x unit price.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.unit_price * self.quantity
    }
}
