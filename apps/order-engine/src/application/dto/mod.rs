//! Data transfer objects for API boundaries.

mod cancellation_dto;
mod delivery_dto;
mod order_dto;
mod payment_dto;

pub use cancellation_dto::{CancellationDto, CreateCancellationRequest, UpdateCancellationRequest};
pub use delivery_dto::{
    CreateDriverRequest, DeliveryDto, DriverDto, UpdateDeliveryRequest, UpdateDriverRequest,
};
pub use order_dto::{CreateOrderRequest, LineItemDto, OrderDto, UpdateOrderRequest};
pub use payment_dto::{CheckoutSessionDto, PaymentDto, PaymentIntentDto};
