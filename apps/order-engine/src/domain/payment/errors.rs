//! Payment errors.

use std::fmt;

/// Errors that can occur in payment persistence and reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// Payment not found.
    NotFound {
        /// Payment ID.
        payment_id: String,
    },

    /// Invalid payment parameters.
    InvalidParameters {
        /// Field with invalid value.
        field: String,
        /// Error message.
        message: String,
    },

    /// Conditional write lost a concurrent race.
    VersionConflict {
        /// Payment ID.
        payment_id: String,
    },
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { payment_id } => {
                write!(f, "Payment not found: {payment_id}")
            }
            Self::InvalidParameters { field, message } => {
                write!(f, "Invalid payment parameter '{field}': {message}")
            }
            Self::VersionConflict { payment_id } => {
                write!(f, "Concurrent update conflict on payment {payment_id}")
            }
        }
    }
}

impl std::error::Error for PaymentError {}
