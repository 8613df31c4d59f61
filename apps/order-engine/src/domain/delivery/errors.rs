//! Delivery errors.

use std::fmt;

use super::value_objects::{DeliveryStatus, DriverAvailability};

/// Errors that can occur in delivery management.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Invalid state transition attempted.
    InvalidStateTransition {
        /// Current delivery status.
        from: DeliveryStatus,
        /// Attempted status.
        to: DeliveryStatus,
    },

    /// Driver is not free to take a delivery.
    DriverUnavailable {
        /// Driver ID.
        driver_id: String,
        /// Current availability.
        availability: DriverAvailability,
    },

    /// Delivery already has a driver.
    AlreadyAssigned {
        /// Delivery ID.
        delivery_id: String,
    },

    /// A busy driver cannot change availability.
    DriverBusy {
        /// Driver ID.
        driver_id: String,
    },

    /// Delivery not found.
    NotFound {
        /// Delivery ID.
        delivery_id: String,
    },

    /// Driver not found.
    DriverNotFound {
        /// Driver ID.
        driver_id: String,
    },

    /// Conditional write lost a concurrent race.
    VersionConflict {
        /// Record ID (delivery or driver).
        id: String,
    },
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStateTransition { from, to } => {
                write!(f, "Invalid delivery state transition: {from} -> {to}")
            }
            Self::DriverUnavailable {
                driver_id,
                availability,
            } => {
                write!(f, "Driver {driver_id} is not free (currently {availability})")
            }
            Self::AlreadyAssigned { delivery_id } => {
                write!(f, "Delivery {delivery_id} already has a driver")
            }
            Self::DriverBusy { driver_id } => {
                write!(f, "Driver {driver_id} is bound to an active delivery")
            }
            Self::NotFound { delivery_id } => {
                write!(f, "Delivery not found: {delivery_id}")
            }
            Self::DriverNotFound { driver_id } => {
                write!(f, "Driver not found: {driver_id}")
            }
            Self::VersionConflict { id } => {
                write!(f, "Concurrent update conflict on {id}")
            }
        }
    }
}

impl std::error::Error for DeliveryError {}
