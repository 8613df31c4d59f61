//! Cancellation errors.

use std::fmt;

use crate::domain::ordering::value_objects::OrderStatus;

/// Errors that can occur in the cancellation flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancellationError {
    /// The order is outside the cancellable status window.
    NotEligible {
        /// Order ID.
        order_id: String,
        /// Current order status.
        status: OrderStatus,
    },

    /// The order is already cancelled.
    AlreadyCancelled {
        /// Order ID.
        order_id: String,
    },

    /// Invalid cancellation parameters.
    InvalidParameters {
        /// Field with invalid value.
        field: String,
        /// Error message.
        message: String,
    },

    /// Cancellation not found.
    NotFound {
        /// Cancellation ID.
        cancellation_id: String,
    },

    /// Conditional write lost a concurrent race.
    VersionConflict {
        /// Cancellation ID.
        cancellation_id: String,
    },
}

impl fmt::Display for CancellationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEligible { order_id, status } => {
                write!(f, "Order {order_id} cannot be cancelled while {status}")
            }
            Self::AlreadyCancelled { order_id } => {
                write!(f, "Order {order_id} is already cancelled")
            }
            Self::InvalidParameters { field, message } => {
                write!(f, "Invalid cancellation parameter '{field}': {message}")
            }
            Self::NotFound { cancellation_id } => {
                write!(f, "Cancellation not found: {cancellation_id}")
            }
            Self::VersionConflict { cancellation_id } => {
                write!(f, "Concurrent update conflict on cancellation {cancellation_id}")
            }
        }
    }
}

impl std::error::Error for CancellationError {}
