//! Ordering errors.

use std::fmt;

use super::value_objects::OrderStatus;

/// Errors that can occur in the order lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Invalid state transition attempted.
    InvalidStateTransition {
        /// Current order status.
        from: OrderStatus,
        /// Attempted status.
        to: OrderStatus,
        /// Reason for failure.
        reason: String,
    },

    /// Invalid order parameters.
    InvalidParameters {
        /// Field with invalid value.
        field: String,
        /// Error message.
        message: String,
    },

    /// A line item references a menu item that does not exist.
    UnknownMenuItem {
        /// The offending menu item id.
        menu_item_id: String,
    },

    /// A line item's unit price disagrees with the menu catalog.
    PriceMismatch {
        /// The offending menu item id.
        menu_item_id: String,
        /// Price from the catalog.
        catalog_price: String,
        /// Price supplied by the client.
        supplied_price: String,
    },

    /// Client-supplied total disagrees with the computed total.
    TotalMismatch {
        /// Total computed from line items.
        computed: String,
        /// Total supplied by the client.
        supplied: String,
    },

    /// Order not found.
    NotFound {
        /// Order ID.
        order_id: String,
    },

    /// Conditional write lost a concurrent race.
    VersionConflict {
        /// Order ID.
        order_id: String,
    },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStateTransition { from, to, reason } => {
                write!(f, "Invalid order state transition: {from} -> {to}: {reason}")
            }
            Self::InvalidParameters { field, message } => {
                write!(f, "Invalid order parameter '{field}': {message}")
            }
            Self::UnknownMenuItem { menu_item_id } => {
                write!(f, "Unknown menu item: {menu_item_id}")
            }
            Self::PriceMismatch {
                menu_item_id,
                catalog_price,
                supplied_price,
            } => {
                write!(
                    f,
                    "Unit price for {menu_item_id} does not match catalog: supplied {supplied_price}, catalog {catalog_price}"
                )
            }
            Self::TotalMismatch { computed, supplied } => {
                write!(
                    f,
                    "Order total mismatch: supplied {supplied}, computed {computed}"
                )
            }
            Self::NotFound { order_id } => {
                write!(f, "Order not found: {order_id}")
            }
            Self::VersionConflict { order_id } => {
                write!(f, "Concurrent update conflict on order {order_id}")
            }
        }
    }
}

impl std::error::Error for OrderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_transition_display() {
        let err = OrderError::InvalidStateTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Delivered,
            reason: "stages cannot be skipped".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("PENDING"));
        assert!(msg.contains("DELIVERED"));
    }

    #[test]
    fn total_mismatch_display() {
        let err = OrderError::TotalMismatch {
            computed: "15.00".to_string(),
            supplied: "12.00".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("15.00"));
        assert!(msg.contains("12.00"));
    }

    #[test]
    fn order_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(OrderError::NotFound {
            order_id: "test".to_string(),
        });
        assert!(!err.to_string().is_empty());
    }
}
