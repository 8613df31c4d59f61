//! Shared value objects.

mod identifiers;
mod money;

pub use identifiers::{
    ActorId, CancellationId, CustomerId, DeliveryId, DriverId, EventId, GatewayRef, MenuItemId,
    OrderId, PaymentId, RestaurantId, TenantId,
};
pub use money::{Currency, Money};
