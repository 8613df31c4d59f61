//! Order State Machine Service
//!
//! Validates order status transitions.

use crate::domain::ordering::errors::OrderError;
use crate::domain::ordering::value_objects::OrderStatus;

/// Order state machine for validating transitions.
///
/// Forward transitions are strictly adjacent in the fulfillment chain;
/// `CANCELLED` is reachable from any non-terminal status but only through
/// the cancellation flow, never through the update path.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Check if a state transition is valid.
    #[must_use]
    pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        if to == OrderStatus::Cancelled {
            return !from.is_terminal();
        }
        from.next_in_chain() == Some(to)
    }

    /// Check if a transition is valid as a caller-requested update.
    ///
    /// Identical to [`Self::is_valid_transition`] except that `CANCELLED`
    /// is never a valid update target; cancellation has its own flow.
    #[must_use]
    pub fn is_valid_update_target(from: OrderStatus, to: OrderStatus) -> bool {
        to != OrderStatus::Cancelled && Self::is_valid_transition(from, to)
    }

    /// Validate a state transition.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is invalid.
    pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(OrderError::InvalidStateTransition {
                from,
                to,
                reason: Self::transition_error_reason(from, to),
            })
        }
    }

    /// Get a human-readable reason for an invalid transition.
    #[must_use]
    pub fn transition_error_reason(from: OrderStatus, to: OrderStatus) -> String {
        match from {
            OrderStatus::Delivered => {
                format!("Order is already delivered, cannot transition to {to}")
            }
            OrderStatus::Cancelled => {
                format!("Order is cancelled, cannot transition to {to}")
            }
            _ => format!("Invalid transition from {from} to {to}"),
        }
    }

    /// Get all valid next states from a given state.
    #[must_use]
    pub fn valid_next_states(from: OrderStatus) -> Vec<OrderStatus> {
        let mut states = Vec::new();
        if let Some(next) = from.next_in_chain() {
            states.push(next);
        }
        if !from.is_terminal() {
            states.push(OrderStatus::Cancelled);
        }
        states
    }
}
