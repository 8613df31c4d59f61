//! Payment bounded context: gateway-settled payments and their
//! reconciliation state.

pub mod aggregate;
pub mod errors;
pub mod repository;
pub mod value_objects;
