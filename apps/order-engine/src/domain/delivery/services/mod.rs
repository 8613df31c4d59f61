//! Delivery domain services.

mod delivery_state_machine;

pub use delivery_state_machine::DeliveryStateMachine;
