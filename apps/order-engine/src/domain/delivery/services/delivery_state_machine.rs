//! Delivery State Machine Service

use crate::domain::delivery::errors::DeliveryError;
use crate::domain::delivery::value_objects::DeliveryStatus;

/// Delivery state machine for validating transitions.
pub struct DeliveryStateMachine;

impl DeliveryStateMachine {
    /// Check if a state transition is valid.
    #[must_use]
    pub fn is_valid_transition(from: DeliveryStatus, to: DeliveryStatus) -> bool {
        matches!(
            (from, to),
            (DeliveryStatus::Unassigned, DeliveryStatus::Assigned)
                | (DeliveryStatus::Assigned, DeliveryStatus::PickedUp)
                | (DeliveryStatus::PickedUp, DeliveryStatus::InTransit)
                | (DeliveryStatus::InTransit, DeliveryStatus::Completed)
                | (
                    DeliveryStatus::Assigned | DeliveryStatus::PickedUp | DeliveryStatus::InTransit,
                    DeliveryStatus::Failed
                )
        )
    }

    /// Validate a state transition.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is invalid.
    pub fn validate_transition(
        from: DeliveryStatus,
        to: DeliveryStatus,
    ) -> Result<(), DeliveryError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(DeliveryError::InvalidStateTransition { from, to })
        }
    }
}
