//! Delivery Service
//!
//! Assigns drivers, advances delivery status, and keeps the parent order in
//! step with the hand-off.

use std::sync::Arc;

use crate::application::dto::{
    CreateDriverRequest, DeliveryDto, DriverDto, UpdateDriverRequest,
};
use crate::application::ports::MenuCatalogPort;
use crate::application::services::OrderService;
use crate::domain::authorization::{Actor, AuthorizationEngine};
use crate::domain::delivery::aggregate::{Delivery, Driver};
use crate::domain::delivery::errors::DeliveryError;
use crate::domain::delivery::query::DeliveryFilter;
use crate::domain::delivery::repository::{DeliveryRepository, DriverRepository};
use crate::domain::delivery::value_objects::DeliveryStatus;
use crate::domain::ordering::repository::OrderRepository;
use crate::domain::ordering::value_objects::OrderStatus;
use crate::domain::payment::repository::PaymentRepository;
use crate::domain::payment::value_objects::PaymentStatus;
use crate::domain::shared::{DeliveryId, DriverId, OrderId};
use crate::error::ServiceError;

/// Attempts for driver-release writes racing other updates.
const RELEASE_ATTEMPTS: usize = 3;

/// Service owning delivery assignment and progression.
pub struct DeliveryService<D, V, O, M, P>
where
    D: DeliveryRepository,
    V: DriverRepository,
    O: OrderRepository,
    M: MenuCatalogPort,
    P: PaymentRepository,
{
    delivery_repo: Arc<D>,
    driver_repo: Arc<V>,
    order_repo: Arc<O>,
    order_service: Arc<OrderService<O, D, M>>,
    payment_repo: Arc<P>,
}

impl<D, V, O, M, P> DeliveryService<D, V, O, M, P>
where
    D: DeliveryRepository,
    V: DriverRepository,
    O: OrderRepository,
    M: MenuCatalogPort,
    P: PaymentRepository,
{
    /// Create a new DeliveryService.
    pub fn new(
        delivery_repo: Arc<D>,
        driver_repo: Arc<V>,
        order_repo: Arc<O>,
        order_service: Arc<OrderService<O, D, M>>,
        payment_repo: Arc<P>,
    ) -> Self {
        Self {
            delivery_repo,
            driver_repo,
            order_repo,
            order_service,
            payment_repo,
        }
    }

    /// Read a single delivery.
    ///
    /// # Errors
    ///
    /// Returns not-found when absent, forbidden when the actor may not see
    /// it.
    pub async fn get_delivery(
        &self,
        actor: &Actor,
        id: &DeliveryId,
    ) -> Result<DeliveryDto, ServiceError> {
        let delivery = self.load(id).await?;
        if !AuthorizationEngine::can_access_delivery(actor, &delivery).is_allowed() {
            return Err(ServiceError::forbidden("not allowed to read this delivery"));
        }
        Ok(DeliveryDto::from_delivery(&delivery))
    }

    /// List deliveries visible to the actor.
    ///
    /// # Errors
    ///
    /// Returns forbidden when the supplied filter conflicts with the
    /// actor's forced ownership constraints.
    pub async fn list_deliveries(
        &self,
        actor: &Actor,
        filter: DeliveryFilter,
    ) -> Result<Vec<DeliveryDto>, ServiceError> {
        let query = AuthorizationEngine::narrow_delivery_filter(actor, filter)?;
        let deliveries = self.delivery_repo.query(&query).await?;
        Ok(deliveries.iter().map(DeliveryDto::from_delivery).collect())
    }

    /// Assign a free driver to an unassigned delivery.
    ///
    /// The driver is marked busy and the delivery ASSIGNED in a single
    /// conditional write guarded by both versions: of two concurrent
    /// assignment attempts exactly one succeeds, the other gets a conflict.
    ///
    /// # Errors
    ///
    /// Returns conflict when the delivery already has a driver, the driver
    /// is not free, or a concurrent assignment won the race.
    pub async fn assign_driver(
        &self,
        actor: &Actor,
        delivery_id: &DeliveryId,
        driver_id: &DriverId,
    ) -> Result<DeliveryDto, ServiceError> {
        let delivery = self.load(delivery_id).await?;
        if !AuthorizationEngine::can_update_delivery(actor, &delivery).is_allowed() {
            return Err(ServiceError::forbidden(
                "not allowed to update this delivery",
            ));
        }

        let order = self
            .order_repo
            .find_by_id(delivery.order_id())
            .await
            .map_err(ServiceError::from)?;
        if order.is_none_or(|o| o.status().is_terminal()) {
            return Err(ServiceError::conflict(
                "the parent order is no longer active",
            ));
        }

        let driver = self
            .driver_repo
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| {
                ServiceError::from(DeliveryError::DriverNotFound {
                    driver_id: driver_id.to_string(),
                })
            })?;

        let mut updated_delivery = delivery.clone();
        updated_delivery.assign(driver_id.clone())?;
        let mut updated_driver = driver.clone();
        updated_driver.mark_busy()?;

        let (stored, _) = self
            .delivery_repo
            .commit_assignment(
                &updated_delivery,
                delivery.version(),
                &updated_driver,
                driver.version(),
            )
            .await?;

        tracing::info!(
            delivery_id = %delivery_id,
            driver_id = %driver_id,
            "driver assigned"
        );

        // A driver heading out moves the order along once the kitchen is done.
        self.order_service
            .advance_for_delivery(
                stored.order_id(),
                OrderStatus::Preparing,
                OrderStatus::OutForDelivery,
            )
            .await?;

        Ok(DeliveryDto::from_delivery(&stored))
    }

    /// Advance a delivery's status.
    ///
    /// COMPLETED additionally requires the order's payment to have settled
    /// and moves the order to DELIVERED; COMPLETED and FAILED free the
    /// driver.
    ///
    /// # Errors
    ///
    /// Returns conflict for invalid transitions, unsettled payments, or a
    /// lost conditional write.
    pub async fn update_status(
        &self,
        actor: &Actor,
        delivery_id: &DeliveryId,
        target: DeliveryStatus,
    ) -> Result<DeliveryDto, ServiceError> {
        let delivery = self.load(delivery_id).await?;
        if !AuthorizationEngine::can_update_delivery(actor, &delivery).is_allowed() {
            return Err(ServiceError::forbidden(
                "not allowed to update this delivery",
            ));
        }
        if matches!(target, DeliveryStatus::Unassigned | DeliveryStatus::Assigned) {
            return Err(ServiceError::validation(
                "drivers are assigned through the driver_id field",
            ));
        }
        if target == DeliveryStatus::Completed {
            let payments = self
                .payment_repo
                .find_by_order(delivery.order_id())
                .await?;
            if !payments
                .iter()
                .any(|p| p.status() == PaymentStatus::Succeeded)
            {
                return Err(ServiceError::conflict(
                    "delivery cannot complete before payment settles",
                ));
            }
        }

        let mut updated = delivery.clone();
        updated.transition(target)?;
        let stored = self.delivery_repo.update(&updated, delivery.version()).await?;
        tracing::info!(delivery_id = %delivery_id, status = %target, "delivery status updated");

        match target {
            DeliveryStatus::PickedUp => {
                self.order_service
                    .advance_for_delivery(
                        stored.order_id(),
                        OrderStatus::Preparing,
                        OrderStatus::OutForDelivery,
                    )
                    .await?;
            }
            DeliveryStatus::Completed => {
                if let Some(driver_id) = stored.driver_id() {
                    self.release_driver(driver_id).await?;
                }
                self.order_service
                    .advance_for_delivery(
                        stored.order_id(),
                        OrderStatus::OutForDelivery,
                        OrderStatus::Delivered,
                    )
                    .await?;
            }
            DeliveryStatus::Failed => {
                if let Some(driver_id) = stored.driver_id() {
                    self.release_driver(driver_id).await?;
                }
            }
            _ => {}
        }

        Ok(DeliveryDto::from_delivery(&stored))
    }

    /// Abandon the order's delivery during cancellation, freeing the
    /// driver. An unassigned delivery is left as-is; the assignment guard
    /// on the terminal order prevents it from ever being picked up.
    ///
    /// # Errors
    ///
    /// Returns error only on storage failure.
    pub async fn fail_for_order(&self, order_id: &OrderId) -> Result<(), ServiceError> {
        let Some(delivery) = self.delivery_repo.find_by_order(order_id).await? else {
            return Ok(());
        };
        if !delivery.status().is_active() {
            return Ok(());
        }

        let mut updated = delivery.clone();
        updated.transition(DeliveryStatus::Failed)?;
        match self.delivery_repo.update(&updated, delivery.version()).await {
            Ok(stored) => {
                tracing::info!(
                    order_id = %order_id,
                    delivery_id = %stored.id(),
                    "delivery abandoned for cancelled order"
                );
                if let Some(driver_id) = stored.driver_id() {
                    self.release_driver(driver_id).await?;
                }
                Ok(())
            }
            Err(DeliveryError::VersionConflict { .. }) => {
                // Someone advanced the delivery concurrently; the cancelled
                // order's completion guard will stop it from finishing.
                tracing::warn!(order_id = %order_id, "delivery moved while cancelling order");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Register a new driver.
    ///
    /// # Errors
    ///
    /// Returns forbidden unless the actor is an operator.
    pub async fn create_driver(
        &self,
        actor: &Actor,
        request: CreateDriverRequest,
    ) -> Result<DriverDto, ServiceError> {
        if !AuthorizationEngine::can_manage_drivers(actor).is_allowed() {
            return Err(ServiceError::forbidden("not allowed to register drivers"));
        }
        let driver = Driver::new(request.tenant_id);
        let stored = self.driver_repo.insert(&driver).await?;
        tracing::info!(driver_id = %stored.id(), "driver registered");
        Ok(DriverDto::from_driver(&stored))
    }

    /// Update a driver's availability.
    ///
    /// # Errors
    ///
    /// Returns conflict when the driver is busy or a concurrent write won
    /// the race.
    pub async fn update_driver(
        &self,
        actor: &Actor,
        driver_id: &DriverId,
        request: UpdateDriverRequest,
    ) -> Result<DriverDto, ServiceError> {
        let driver = self
            .driver_repo
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| {
                ServiceError::from(DeliveryError::DriverNotFound {
                    driver_id: driver_id.to_string(),
                })
            })?;
        if !AuthorizationEngine::can_update_driver(actor, &driver).is_allowed() {
            return Err(ServiceError::forbidden("not allowed to update this driver"));
        }

        let mut updated = driver.clone();
        updated.set_availability(request.availability)?;
        let stored = self.driver_repo.update(&updated, driver.version()).await?;
        tracing::info!(
            driver_id = %driver_id,
            availability = %request.availability,
            "driver availability updated"
        );
        Ok(DriverDto::from_driver(&stored))
    }

    /// List all drivers.
    ///
    /// # Errors
    ///
    /// Returns forbidden unless the actor is an operator or restaurant
    /// role.
    pub async fn list_drivers(&self, actor: &Actor) -> Result<Vec<DriverDto>, ServiceError> {
        if !AuthorizationEngine::can_list_drivers(actor).is_allowed() {
            return Err(ServiceError::forbidden("not allowed to list drivers"));
        }
        let drivers = self.driver_repo.list().await?;
        Ok(drivers.iter().map(DriverDto::from_driver).collect())
    }

    async fn load(&self, id: &DeliveryId) -> Result<Delivery, ServiceError> {
        self.delivery_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| {
                DeliveryError::NotFound {
                    delivery_id: id.to_string(),
                }
                .into()
            })
    }

    /// Free a driver after their delivery ended, retrying lost writes.
    async fn release_driver(&self, driver_id: &DriverId) -> Result<(), ServiceError> {
        for _ in 0..RELEASE_ATTEMPTS {
            let Some(driver) = self.driver_repo.find_by_id(driver_id).await? else {
                return Ok(());
            };
            let mut updated = driver.clone();
            updated.mark_free();
            match self.driver_repo.update(&updated, driver.version()).await {
                Ok(_) => {
                    tracing::info!(driver_id = %driver_id, "driver freed");
                    return Ok(());
                }
                Err(DeliveryError::VersionConflict { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
        tracing::warn!(driver_id = %driver_id, "could not free driver after repeated conflicts");
        Ok(())
    }
}
