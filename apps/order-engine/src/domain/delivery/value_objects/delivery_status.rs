//! Delivery status in the hand-off lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery status.
///
/// Forward transitions are monotonic:
/// `UNASSIGNED -> ASSIGNED -> PICKED_UP -> IN_TRANSIT -> COMPLETED`.
/// `FAILED` is an exceptional terminal state reachable from the three
/// in-flight stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    /// Created alongside order confirmation, waiting for a driver.
    Unassigned,
    /// A driver has claimed the delivery.
    Assigned,
    /// Driver picked the order up at the restaurant.
    PickedUp,
    /// Driver is en route to the customer.
    InTransit,
    /// Order handed to the customer.
    Completed,
    /// Delivery abandoned (driver issue or order cancelled).
    Failed,
}

impl DeliveryStatus {
    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true while a driver is actively bound to the delivery.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Assigned | Self::PickedUp | Self::InTransit)
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unassigned => write!(f, "UNASSIGNED"),
            Self::Assigned => write!(f, "ASSIGNED"),
            Self::PickedUp => write!(f, "PICKED_UP"),
            Self::InTransit => write!(f, "IN_TRANSIT"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Driver availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverAvailability {
    /// Free to take a delivery.
    Free,
    /// Bound to an active delivery.
    Busy,
    /// Off shift.
    Offline,
}

impl fmt::Display for DriverAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "FREE"),
            Self::Busy => write!(f, "BUSY"),
            Self::Offline => write!(f, "OFFLINE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_status_is_terminal() {
        assert!(!DeliveryStatus::Unassigned.is_terminal());
        assert!(!DeliveryStatus::InTransit.is_terminal());
        assert!(DeliveryStatus::Completed.is_terminal());
        assert!(DeliveryStatus::Failed.is_terminal());
    }

    #[test]
    fn delivery_status_is_active() {
        assert!(!DeliveryStatus::Unassigned.is_active());
        assert!(DeliveryStatus::Assigned.is_active());
        assert!(DeliveryStatus::PickedUp.is_active());
        assert!(DeliveryStatus::InTransit.is_active());
        assert!(!DeliveryStatus::Completed.is_active());
    }

    #[test]
    fn delivery_status_serde() {
        let json = serde_json::to_string(&DeliveryStatus::PickedUp).unwrap();
        assert_eq!(json, "\"PICKED_UP\"");
    }

    #[test]
    fn driver_availability_display() {
        assert_eq!(format!("{}", DriverAvailability::Busy), "BUSY");
    }
}
