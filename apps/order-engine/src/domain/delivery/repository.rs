//! Delivery and Driver Repository Traits

use async_trait::async_trait;

use super::aggregate::{Delivery, Driver};
use super::errors::DeliveryError;
use super::query::DeliveryQuery;
use crate::domain::shared::{DeliveryId, DriverId, OrderId};

/// Repository trait for Delivery persistence.
#[async_trait]
pub trait DeliveryRepository: Send + Sync {
    /// Insert a new delivery.
    ///
    /// # Errors
    ///
    /// Returns error if persistence fails.
    async fn insert(&self, delivery: &Delivery) -> Result<Delivery, DeliveryError>;

    /// Find a delivery by its ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_id(&self, id: &DeliveryId) -> Result<Option<Delivery>, DeliveryError>;

    /// Find the delivery created for an order.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_order(&self, order_id: &OrderId) -> Result<Option<Delivery>, DeliveryError>;

    /// Find all deliveries satisfying an effective query.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn query(&self, query: &DeliveryQuery) -> Result<Vec<Delivery>, DeliveryError>;

    /// Conditionally update a delivery.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::VersionConflict`] when a concurrent write
    /// won the race, [`DeliveryError::NotFound`] when the delivery does not
    /// exist.
    async fn update(
        &self,
        delivery: &Delivery,
        expected_version: u64,
    ) -> Result<Delivery, DeliveryError>;

    /// Commit a driver assignment: the delivery and the driver are written
    /// together in one transaction, each guarded by its expected version.
    ///
    /// Exactly one of two concurrent assignment attempts for the same
    /// delivery (or the same driver) can succeed; the loser gets a version
    /// conflict.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::VersionConflict`] when either record moved
    /// since it was read.
    async fn commit_assignment(
        &self,
        delivery: &Delivery,
        expected_delivery_version: u64,
        driver: &Driver,
        expected_driver_version: u64,
    ) -> Result<(Delivery, Driver), DeliveryError>;
}

/// Repository trait for Driver persistence.
#[async_trait]
pub trait DriverRepository: Send + Sync {
    /// Insert a new driver.
    ///
    /// # Errors
    ///
    /// Returns error if persistence fails.
    async fn insert(&self, driver: &Driver) -> Result<Driver, DeliveryError>;

    /// Find a driver by its ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_id(&self, id: &DriverId) -> Result<Option<Driver>, DeliveryError>;

    /// List all drivers.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn list(&self) -> Result<Vec<Driver>, DeliveryError>;

    /// Conditionally update a driver.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::VersionConflict`] when a concurrent write
    /// won the race, [`DeliveryError::DriverNotFound`] when the driver does
    /// not exist.
    async fn update(&self, driver: &Driver, expected_version: u64)
    -> Result<Driver, DeliveryError>;
}
