//! Delivery and driver DTOs crossing the API boundary.

use serde::{Deserialize, Serialize};

use crate::domain::delivery::aggregate::{Delivery, Driver};
use crate::domain::delivery::value_objects::{DeliveryStatus, DriverAvailability};
use crate::domain::shared::{CustomerId, DeliveryId, DriverId, OrderId, RestaurantId, TenantId};

/// Request body for updating a delivery: either assign a driver or advance
/// the status, never both in one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateDeliveryRequest {
    /// Driver to assign.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<DriverId>,
    /// Target status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeliveryStatus>,
}

/// Request body for registering a driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDriverRequest {
    /// Owning tenant.
    pub tenant_id: TenantId,
}

/// Request body for updating a driver's availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateDriverRequest {
    /// New availability.
    pub availability: DriverAvailability,
}

/// A delivery as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryDto {
    /// Delivery id.
    pub id: DeliveryId,
    /// Parent order.
    pub order_id: OrderId,
    /// Customer of the parent order.
    pub customer_id: CustomerId,
    /// Restaurant of the parent order.
    pub restaurant_id: RestaurantId,
    /// Assigned driver, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<DriverId>,
    /// Status.
    pub status: DeliveryStatus,
}

impl DeliveryDto {
    /// Build the DTO from a domain delivery.
    #[must_use]
    pub fn from_delivery(delivery: &Delivery) -> Self {
        Self {
            id: delivery.id().clone(),
            order_id: delivery.order_id().clone(),
            customer_id: delivery.customer_id().clone(),
            restaurant_id: delivery.restaurant_id().clone(),
            driver_id: delivery.driver_id().cloned(),
            status: delivery.status(),
        }
    }
}

/// A driver as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverDto {
    /// Driver id.
    pub id: DriverId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Availability.
    pub availability: DriverAvailability,
}

impl DriverDto {
    /// Build the DTO from a domain driver.
    #[must_use]
    pub fn from_driver(driver: &Driver) -> Self {
        Self {
            id: driver.id().clone(),
            tenant_id: driver.tenant_id().clone(),
            availability: driver.availability(),
        }
    }
}
