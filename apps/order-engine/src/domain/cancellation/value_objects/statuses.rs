//! Cancellation and refund statuses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cancellation status.
///
/// A cancellation stays `PROCESSING` while a refund is in flight and
/// becomes `COMPLETED` once refund state is settled (or no refund was
/// needed). A failed refund leaves the cancellation `PROCESSING` for
/// operator attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancellationStatus {
    /// Cancellation recorded, refund (if any) not yet settled.
    Processing,
    /// Cancellation fully settled.
    Completed,
}

impl fmt::Display for CancellationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processing => write!(f, "PROCESSING"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Refund status, gated by the cancellation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    /// No settled payment existed, nothing to refund.
    NotRequired,
    /// Refund requested from the gateway, outcome pending.
    Requested,
    /// Gateway confirmed the refund.
    Completed,
    /// Gateway reported the refund failed.
    Failed,
}

impl RefundStatus {
    /// Returns true once the gateway has answered.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::NotRequired | Self::Completed | Self::Failed)
    }
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRequired => write!(f, "NOT_REQUIRED"),
            Self::Requested => write!(f, "REQUESTED"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refund_status_settled() {
        assert!(RefundStatus::NotRequired.is_settled());
        assert!(!RefundStatus::Requested.is_settled());
        assert!(RefundStatus::Completed.is_settled());
        assert!(RefundStatus::Failed.is_settled());
    }

    #[test]
    fn statuses_serde() {
        assert_eq!(
            serde_json::to_string(&RefundStatus::NotRequired).unwrap(),
            "\"NOT_REQUIRED\""
        );
        assert_eq!(
            serde_json::to_string(&CancellationStatus::Processing).unwrap(),
            "\"PROCESSING\""
        );
    }
}
