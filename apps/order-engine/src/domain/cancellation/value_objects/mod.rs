//! Cancellation value objects.

mod statuses;

pub use statuses::{CancellationStatus, RefundStatus};
