//! In-memory persistence adapter.
//!
//! Implements every repository trait over a single locked map set, which
//! also gives the two-record driver-assignment write its transactional
//! guarantee. Suitable for testing and development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::cancellation::aggregate::OrderCancellation;
use crate::domain::cancellation::errors::CancellationError;
use crate::domain::cancellation::query::CancellationQuery;
use crate::domain::cancellation::repository::CancellationRepository;
use crate::domain::delivery::aggregate::{Delivery, Driver};
use crate::domain::delivery::errors::DeliveryError;
use crate::domain::delivery::query::DeliveryQuery;
use crate::domain::delivery::repository::{DeliveryRepository, DriverRepository};
use crate::domain::ordering::aggregate::Order;
use crate::domain::ordering::errors::OrderError;
use crate::domain::ordering::query::OrderQuery;
use crate::domain::ordering::repository::OrderRepository;
use crate::domain::payment::aggregate::Payment;
use crate::domain::payment::errors::PaymentError;
use crate::domain::payment::repository::PaymentRepository;
use crate::domain::shared::{CancellationId, DeliveryId, DriverId, GatewayRef, OrderId, PaymentId};

#[derive(Debug, Default)]
struct Tables {
    orders: HashMap<String, Order>,
    payments: HashMap<String, Payment>,
    payments_by_gateway_ref: HashMap<String, String>,
    deliveries: HashMap<String, Delivery>,
    drivers: HashMap<String, Driver>,
    cancellations: HashMap<String, OrderCancellation>,
}

/// In-memory implementation of all repository traits.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::unwrap_used)]
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap()
    }

    #[allow(clippy::unwrap_used)]
    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap()
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn insert(&self, order: &Order) -> Result<Order, OrderError> {
        let mut tables = self.write();
        let mut stored = order.clone();
        stored.set_version(1);
        tables.orders.insert(order.id().to_string(), stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderError> {
        Ok(self.read().orders.get(id.as_str()).cloned())
    }

    async fn query(&self, query: &OrderQuery) -> Result<Vec<Order>, OrderError> {
        Ok(self
            .read()
            .orders
            .values()
            .filter(|o| query.matches(o))
            .cloned()
            .collect())
    }

    async fn update(&self, order: &Order, expected_version: u64) -> Result<Order, OrderError> {
        let mut tables = self.write();
        let current = tables
            .orders
            .get(order.id().as_str())
            .ok_or_else(|| OrderError::NotFound {
                order_id: order.id().to_string(),
            })?;
        if current.version() != expected_version {
            return Err(OrderError::VersionConflict {
                order_id: order.id().to_string(),
            });
        }
        let mut stored = order.clone();
        stored.set_version(expected_version + 1);
        tables.orders.insert(order.id().to_string(), stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn insert(&self, payment: &Payment) -> Result<Payment, PaymentError> {
        let mut tables = self.write();
        let mut stored = payment.clone();
        stored.set_version(1);
        tables
            .payments_by_gateway_ref
            .insert(payment.gateway_ref().to_string(), payment.id().to_string());
        tables
            .payments
            .insert(payment.id().to_string(), stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, PaymentError> {
        Ok(self.read().payments.get(id.as_str()).cloned())
    }

    async fn find_by_gateway_ref(
        &self,
        gateway_ref: &GatewayRef,
    ) -> Result<Option<Payment>, PaymentError> {
        let tables = self.read();
        Ok(tables
            .payments_by_gateway_ref
            .get(gateway_ref.as_str())
            .and_then(|id| tables.payments.get(id))
            .cloned())
    }

    async fn find_by_order(&self, order_id: &OrderId) -> Result<Vec<Payment>, PaymentError> {
        Ok(self
            .read()
            .payments
            .values()
            .filter(|p| p.order_id() == order_id)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        payment: &Payment,
        expected_version: u64,
    ) -> Result<Payment, PaymentError> {
        let mut tables = self.write();
        let current = tables
            .payments
            .get(payment.id().as_str())
            .ok_or_else(|| PaymentError::NotFound {
                payment_id: payment.id().to_string(),
            })?;
        if current.version() != expected_version {
            return Err(PaymentError::VersionConflict {
                payment_id: payment.id().to_string(),
            });
        }
        let mut stored = payment.clone();
        stored.set_version(expected_version + 1);
        tables
            .payments
            .insert(payment.id().to_string(), stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl DeliveryRepository for InMemoryStore {
    async fn insert(&self, delivery: &Delivery) -> Result<Delivery, DeliveryError> {
        let mut tables = self.write();
        let mut stored = delivery.clone();
        stored.set_version(1);
        tables
            .deliveries
            .insert(delivery.id().to_string(), stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &DeliveryId) -> Result<Option<Delivery>, DeliveryError> {
        Ok(self.read().deliveries.get(id.as_str()).cloned())
    }

    async fn find_by_order(&self, order_id: &OrderId) -> Result<Option<Delivery>, DeliveryError> {
        Ok(self
            .read()
            .deliveries
            .values()
            .find(|d| d.order_id() == order_id)
            .cloned())
    }

    async fn query(&self, query: &DeliveryQuery) -> Result<Vec<Delivery>, DeliveryError> {
        Ok(self
            .read()
            .deliveries
            .values()
            .filter(|d| query.matches(d))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        delivery: &Delivery,
        expected_version: u64,
    ) -> Result<Delivery, DeliveryError> {
        let mut tables = self.write();
        let current = tables
            .deliveries
            .get(delivery.id().as_str())
            .ok_or_else(|| DeliveryError::NotFound {
                delivery_id: delivery.id().to_string(),
            })?;
        if current.version() != expected_version {
            return Err(DeliveryError::VersionConflict {
                id: delivery.id().to_string(),
            });
        }
        let mut stored = delivery.clone();
        stored.set_version(expected_version + 1);
        tables
            .deliveries
            .insert(delivery.id().to_string(), stored.clone());
        Ok(stored)
    }

    async fn commit_assignment(
        &self,
        delivery: &Delivery,
        expected_delivery_version: u64,
        driver: &Driver,
        expected_driver_version: u64,
    ) -> Result<(Delivery, Driver), DeliveryError> {
        let mut tables = self.write();

        let current_delivery = tables
            .deliveries
            .get(delivery.id().as_str())
            .ok_or_else(|| DeliveryError::NotFound {
                delivery_id: delivery.id().to_string(),
            })?;
        if current_delivery.version() != expected_delivery_version {
            return Err(DeliveryError::VersionConflict {
                id: delivery.id().to_string(),
            });
        }
        let current_driver = tables
            .drivers
            .get(driver.id().as_str())
            .ok_or_else(|| DeliveryError::DriverNotFound {
                driver_id: driver.id().to_string(),
            })?;
        if current_driver.version() != expected_driver_version {
            return Err(DeliveryError::VersionConflict {
                id: driver.id().to_string(),
            });
        }

        let mut stored_delivery = delivery.clone();
        stored_delivery.set_version(expected_delivery_version + 1);
        let mut stored_driver = driver.clone();
        stored_driver.set_version(expected_driver_version + 1);
        tables
            .deliveries
            .insert(delivery.id().to_string(), stored_delivery.clone());
        tables
            .drivers
            .insert(driver.id().to_string(), stored_driver.clone());
        Ok((stored_delivery, stored_driver))
    }
}

#[async_trait]
impl DriverRepository for InMemoryStore {
    async fn insert(&self, driver: &Driver) -> Result<Driver, DeliveryError> {
        let mut tables = self.write();
        let mut stored = driver.clone();
        stored.set_version(1);
        tables
            .drivers
            .insert(driver.id().to_string(), stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &DriverId) -> Result<Option<Driver>, DeliveryError> {
        Ok(self.read().drivers.get(id.as_str()).cloned())
    }

    async fn list(&self) -> Result<Vec<Driver>, DeliveryError> {
        Ok(self.read().drivers.values().cloned().collect())
    }

    async fn update(
        &self,
        driver: &Driver,
        expected_version: u64,
    ) -> Result<Driver, DeliveryError> {
        let mut tables = self.write();
        let current = tables
            .drivers
            .get(driver.id().as_str())
            .ok_or_else(|| DeliveryError::DriverNotFound {
                driver_id: driver.id().to_string(),
            })?;
        if current.version() != expected_version {
            return Err(DeliveryError::VersionConflict {
                id: driver.id().to_string(),
            });
        }
        let mut stored = driver.clone();
        stored.set_version(expected_version + 1);
        tables
            .drivers
            .insert(driver.id().to_string(), stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl CancellationRepository for InMemoryStore {
    async fn insert(
        &self,
        cancellation: &OrderCancellation,
    ) -> Result<OrderCancellation, CancellationError> {
        let mut tables = self.write();
        let mut stored = cancellation.clone();
        stored.set_version(1);
        tables
            .cancellations
            .insert(cancellation.id().to_string(), stored.clone());
        Ok(stored)
    }

    async fn find_by_id(
        &self,
        id: &CancellationId,
    ) -> Result<Option<OrderCancellation>, CancellationError> {
        Ok(self.read().cancellations.get(id.as_str()).cloned())
    }

    async fn find_by_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<OrderCancellation>, CancellationError> {
        Ok(self
            .read()
            .cancellations
            .values()
            .find(|c| c.order_id() == order_id)
            .cloned())
    }

    async fn query(
        &self,
        query: &CancellationQuery,
    ) -> Result<Vec<OrderCancellation>, CancellationError> {
        Ok(self
            .read()
            .cancellations
            .values()
            .filter(|c| query.matches(c))
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        cancellation: &OrderCancellation,
        expected_version: u64,
    ) -> Result<OrderCancellation, CancellationError> {
        let mut tables = self.write();
        let current = tables
            .cancellations
            .get(cancellation.id().as_str())
            .ok_or_else(|| CancellationError::NotFound {
                cancellation_id: cancellation.id().to_string(),
            })?;
        if current.version() != expected_version {
            return Err(CancellationError::VersionConflict {
                cancellation_id: cancellation.id().to_string(),
            });
        }
        let mut stored = cancellation.clone();
        stored.set_version(expected_version + 1);
        tables
            .cancellations
            .insert(cancellation.id().to_string(), stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::delivery::value_objects::DeliveryStatus;
    use crate::domain::ordering::aggregate::{CreateOrderCommand, LineItem};
    use crate::domain::ordering::value_objects::OrderStatus;
    use crate::domain::shared::{CustomerId, MenuItemId, Money, RestaurantId, TenantId};
    use rust_decimal_macros::dec;

    fn make_order() -> Order {
        Order::new(CreateOrderCommand {
            customer_id: CustomerId::new("cust-1"),
            restaurant_id: RestaurantId::new("rest-1"),
            tenant_id: TenantId::new("tenant-1"),
            line_items: vec![
                LineItem::new(MenuItemId::new("item-1"), 1, Money::new(dec!(10.00))).unwrap(),
            ],
            declared_total: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_version_one() {
        let store = InMemoryStore::new();
        let stored = OrderRepository::insert(&store, &make_order()).await.unwrap();
        assert_eq!(stored.version(), 1);
    }

    #[tokio::test]
    async fn conditional_update_bumps_version() {
        let store = InMemoryStore::new();
        let stored = OrderRepository::insert(&store, &make_order()).await.unwrap();

        let mut updated = stored.clone();
        updated.transition(OrderStatus::Confirmed).unwrap();
        let stored2 = OrderRepository::update(&store, &updated, 1).await.unwrap();
        assert_eq!(stored2.version(), 2);
        assert_eq!(stored2.status(), OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn stale_version_conflicts() {
        let store = InMemoryStore::new();
        let stored = OrderRepository::insert(&store, &make_order()).await.unwrap();

        let mut a = stored.clone();
        a.transition(OrderStatus::Confirmed).unwrap();
        OrderRepository::update(&store, &a, 1).await.unwrap();

        // A second writer holding the stale version loses.
        let mut b = stored.clone();
        b.transition(OrderStatus::Confirmed).unwrap();
        let result = OrderRepository::update(&store, &b, 1).await;
        assert!(matches!(result, Err(OrderError::VersionConflict { .. })));
    }

    #[tokio::test]
    async fn update_of_missing_order_is_not_found() {
        let store = InMemoryStore::new();
        let order = make_order();
        let result = OrderRepository::update(&store, &order, 1).await;
        assert!(matches!(result, Err(OrderError::NotFound { .. })));
    }

    #[tokio::test]
    async fn payment_lookup_by_gateway_ref() {
        let store = InMemoryStore::new();
        let payment = Payment::new(
            OrderId::new("ord-1"),
            Money::new(dec!(15.00)),
            crate::domain::shared::Currency::Usd,
            GatewayRef::new("pi_123"),
        )
        .unwrap();
        PaymentRepository::insert(&store, &payment).await.unwrap();

        let found = store
            .find_by_gateway_ref(&GatewayRef::new("pi_123"))
            .await
            .unwrap();
        assert!(found.is_some());
        assert!(
            store
                .find_by_gateway_ref(&GatewayRef::new("pi_999"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn commit_assignment_is_all_or_nothing() {
        let store = InMemoryStore::new();
        let delivery = Delivery::new(
            OrderId::new("ord-1"),
            CustomerId::new("cust-1"),
            RestaurantId::new("rest-1"),
        );
        let driver = Driver::new(TenantId::new("tenant-1"));
        let delivery = DeliveryRepository::insert(&store, &delivery).await.unwrap();
        let driver = DriverRepository::insert(&store, &driver).await.unwrap();

        let mut d2 = delivery.clone();
        d2.assign(driver.id().clone()).unwrap();
        let mut dr2 = driver.clone();
        dr2.mark_busy().unwrap();

        // First commit wins.
        store
            .commit_assignment(&d2, delivery.version(), &dr2, driver.version())
            .await
            .unwrap();

        // Second commit with the same expected versions loses, and neither
        // record is touched by the failed attempt.
        let result = store
            .commit_assignment(&d2, delivery.version(), &dr2, driver.version())
            .await;
        assert!(matches!(result, Err(DeliveryError::VersionConflict { .. })));

        let current = DeliveryRepository::find_by_id(&store, delivery.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.status(), DeliveryStatus::Assigned);
        assert_eq!(current.version(), 2);
    }
}
