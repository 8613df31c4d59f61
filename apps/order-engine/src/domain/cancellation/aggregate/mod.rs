//! OrderCancellation aggregate root.

mod cancellation;

pub use cancellation::OrderCancellation;
