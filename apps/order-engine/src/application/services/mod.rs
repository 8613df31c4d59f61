//! Application services orchestrating the domain.

mod cancellation_service;
mod delivery_service;
mod order_service;
mod payment_service;

pub use cancellation_service::CancellationService;
pub use delivery_service::DeliveryService;
pub use order_service::OrderService;
pub use payment_service::{PaymentService, WebhookOutcome};
