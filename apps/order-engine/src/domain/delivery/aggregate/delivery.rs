//! Delivery aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::delivery::errors::DeliveryError;
use crate::domain::delivery::services::DeliveryStateMachine;
use crate::domain::delivery::value_objects::DeliveryStatus;
use crate::domain::shared::{CustomerId, DeliveryId, DriverId, OrderId, RestaurantId};

/// The Delivery aggregate root.
///
/// Owned by its parent order; customer and restaurant are denormalized from
/// the order so list queries can be narrowed without a join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    id: DeliveryId,
    order_id: OrderId,
    customer_id: CustomerId,
    restaurant_id: RestaurantId,
    driver_id: Option<DriverId>,
    status: DeliveryStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
}

impl Delivery {
    /// Create an UNASSIGNED delivery for a confirmed order.
    #[must_use]
    pub fn new(order_id: OrderId, customer_id: CustomerId, restaurant_id: RestaurantId) -> Self {
        let now = Utc::now();
        Self {
            id: DeliveryId::generate(),
            order_id,
            customer_id,
            restaurant_id,
            driver_id: None,
            status: DeliveryStatus::Unassigned,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Bind a driver and move to ASSIGNED.
    ///
    /// # Errors
    ///
    /// Returns error if the delivery already has a driver or is past
    /// UNASSIGNED.
    pub fn assign(&mut self, driver_id: DriverId) -> Result<(), DeliveryError> {
        if self.driver_id.is_some() {
            return Err(DeliveryError::AlreadyAssigned {
                delivery_id: self.id.to_string(),
            });
        }
        DeliveryStateMachine::validate_transition(self.status, DeliveryStatus::Assigned)?;
        self.driver_id = Some(driver_id);
        self.status = DeliveryStatus::Assigned;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Apply a status transition.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is not valid from the current status.
    pub fn transition(&mut self, to: DeliveryStatus) -> Result<(), DeliveryError> {
        DeliveryStateMachine::validate_transition(self.status, to)?;
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Delivery ID.
    #[must_use]
    pub const fn id(&self) -> &DeliveryId {
        &self.id
    }

    /// Parent order.
    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Customer of the parent order.
    #[must_use]
    pub const fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Restaurant of the parent order.
    #[must_use]
    pub const fn restaurant_id(&self) -> &RestaurantId {
        &self.restaurant_id
    }

    /// Assigned driver, if any.
    #[must_use]
    pub const fn driver_id(&self) -> Option<&DriverId> {
        self.driver_id.as_ref()
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> DeliveryStatus {
        self.status
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Version counter used for conditional writes.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Set the version counter. Called by persistence adapters only.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}
