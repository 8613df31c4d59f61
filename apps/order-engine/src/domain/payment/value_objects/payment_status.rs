//! Payment status in the settlement lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment status.
///
/// A payment starts `PENDING` when checkout is initiated and reaches a
/// terminal state only through gateway event reconciliation, never by
/// direct client mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Gateway object created, settlement outcome unknown.
    Pending,
    /// Gateway reported the payment settled.
    Succeeded,
    /// Gateway reported the payment failed.
    Failed,
}

impl PaymentStatus {
    /// Returns true if the payment has settled one way or the other.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Returns true if the amount counts against the order's balance.
    ///
    /// Pending and succeeded payments both reserve balance; only failed
    /// payments release it.
    #[must_use]
    pub const fn counts_toward_balance(&self) -> bool {
        !matches!(self, Self::Failed)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Succeeded => write!(f, "SUCCEEDED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}
