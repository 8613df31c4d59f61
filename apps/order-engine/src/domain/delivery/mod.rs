//! Delivery bounded context: deliveries, drivers and assignment.

pub mod aggregate;
pub mod errors;
pub mod query;
pub mod repository;
pub mod services;
pub mod value_objects;
