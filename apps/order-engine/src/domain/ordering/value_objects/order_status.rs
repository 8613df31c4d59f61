//! Order status in the fulfillment lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status.
///
/// The forward chain is strictly sequential:
/// `PENDING -> CONFIRMED -> PREPARING -> OUT_FOR_DELIVERY -> DELIVERED`.
/// `CANCELLED` is terminal and reachable from any non-terminal status, but
/// only through the cancellation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order placed by the customer, not yet confirmed by the restaurant.
    Pending,
    /// Restaurant (or a settled payment) confirmed the order.
    Confirmed,
    /// Kitchen is preparing the order.
    Preparing,
    /// A driver is carrying the order to the customer.
    OutForDelivery,
    /// Order handed to the customer.
    Delivered,
    /// Order cancelled before delivery.
    Cancelled,
}

impl OrderStatus {
    /// Returns true if the order is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Returns true if a cancellation may still be requested.
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::Preparing)
    }

    /// Returns true if line items may still be mutated.
    #[must_use]
    pub const fn is_mutable(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The next status in the forward chain, if any.
    #[must_use]
    pub const fn next_in_chain(&self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::Preparing),
            Self::Preparing => Some(Self::OutForDelivery),
            Self::OutForDelivery => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Confirmed => write!(f, "CONFIRMED"),
            Self::Preparing => write!(f, "PREPARING"),
            Self::OutForDelivery => write!(f, "OUT_FOR_DELIVERY"),
            Self::Delivered => write!(f, "DELIVERED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_is_terminal() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::OutForDelivery.is_terminal());
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn order_status_is_cancellable() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::Confirmed.is_cancellable());
        assert!(OrderStatus::Preparing.is_cancellable());
        assert!(!OrderStatus::OutForDelivery.is_cancellable());
        assert!(!OrderStatus::Delivered.is_cancellable());
        assert!(!OrderStatus::Cancelled.is_cancellable());
    }

    #[test]
    fn order_status_chain() {
        assert_eq!(
            OrderStatus::Pending.next_in_chain(),
            Some(OrderStatus::Confirmed)
        );
        assert_eq!(
            OrderStatus::OutForDelivery.next_in_chain(),
            Some(OrderStatus::Delivered)
        );
        assert_eq!(OrderStatus::Delivered.next_in_chain(), None);
        assert_eq!(OrderStatus::Cancelled.next_in_chain(), None);
    }

    #[test]
    fn order_status_serde() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"OUT_FOR_DELIVERY\"");

        let parsed: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }

    #[test]
    fn order_status_display() {
        assert_eq!(format!("{}", OrderStatus::OutForDelivery), "OUT_FOR_DELIVERY");
        assert_eq!(format!("{}", OrderStatus::Pending), "PENDING");
    }
}
