//! Payment aggregate root.

mod payment;

pub use payment::{EventApplication, Payment};
