//! Delivery value objects.

mod delivery_status;

pub use delivery_status::{DeliveryStatus, DriverAvailability};
