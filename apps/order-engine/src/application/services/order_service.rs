//! Order Service
//!
//! Owns order state transitions and orchestrates delivery creation.

use std::sync::Arc;

use crate::application::dto::{CreateOrderRequest, OrderDto};
use crate::application::ports::MenuCatalogPort;
use crate::domain::authorization::{Actor, AuthorizationEngine};
use crate::domain::delivery::aggregate::Delivery;
use crate::domain::delivery::repository::DeliveryRepository;
use crate::domain::ordering::aggregate::{CreateOrderCommand, LineItem, Order};
use crate::domain::ordering::errors::OrderError;
use crate::domain::ordering::query::OrderFilter;
use crate::domain::ordering::repository::OrderRepository;
use crate::domain::ordering::services::OrderStateMachine;
use crate::domain::ordering::value_objects::OrderStatus;
use crate::domain::shared::OrderId;
use crate::error::ServiceError;

/// Attempts for webhook-driven confirmation racing human updates.
const CONFIRM_ATTEMPTS: usize = 3;

/// Service owning the order lifecycle.
pub struct OrderService<O, D, M>
where
    O: OrderRepository,
    D: DeliveryRepository,
    M: MenuCatalogPort,
{
    order_repo: Arc<O>,
    delivery_repo: Arc<D>,
    menu_catalog: Arc<M>,
}

impl<O, D, M> OrderService<O, D, M>
where
    O: OrderRepository,
    D: DeliveryRepository,
    M: MenuCatalogPort,
{
    /// Create a new OrderService.
    pub fn new(order_repo: Arc<O>, delivery_repo: Arc<D>, menu_catalog: Arc<M>) -> Self {
        Self {
            order_repo,
            delivery_repo,
            menu_catalog,
        }
    }

    /// Create a PENDING order for the calling customer.
    ///
    /// Every line item must reference an existing menu item of the target
    /// restaurant at the catalog's current price; a client-supplied total
    /// that disagrees with the recomputed total is rejected.
    ///
    /// # Errors
    ///
    /// Returns forbidden for non-customers, validation errors for bad line
    /// items or a total mismatch.
    pub async fn create_order(
        &self,
        actor: &Actor,
        request: CreateOrderRequest,
    ) -> Result<OrderDto, ServiceError> {
        if !AuthorizationEngine::can_create_order(actor).is_allowed() {
            return Err(ServiceError::forbidden("only customers may place orders"));
        }

        let mut line_items = Vec::with_capacity(request.line_items.len());
        for dto in &request.line_items {
            let item = self
                .menu_catalog
                .find_item(&dto.menu_item_id)
                .await
                .ok_or_else(|| {
                    ServiceError::from(OrderError::UnknownMenuItem {
                        menu_item_id: dto.menu_item_id.to_string(),
                    })
                })?;
            if item.restaurant_id != request.restaurant_id {
                return Err(ServiceError::validation(format!(
                    "menu item {} belongs to a different restaurant",
                    dto.menu_item_id
                )));
            }
            if item.unit_price != dto.unit_price {
                return Err(OrderError::PriceMismatch {
                    menu_item_id: dto.menu_item_id.to_string(),
                    catalog_price: item.unit_price.to_string(),
                    supplied_price: dto.unit_price.to_string(),
                }
                .into());
            }
            line_items.push(LineItem::new(
                dto.menu_item_id.clone(),
                dto.quantity,
                dto.unit_price,
            )?);
        }

        let order = Order::new(CreateOrderCommand {
            customer_id: actor.as_customer_id(),
            restaurant_id: request.restaurant_id,
            tenant_id: request.tenant_id,
            line_items,
            declared_total: request.total,
        })?;

        let stored = self.order_repo.insert(&order).await?;
        tracing::info!(
            order_id = %stored.id(),
            customer_id = %stored.customer_id(),
            total = %stored.total(),
            "order created"
        );
        Ok(OrderDto::from_order(&stored))
    }

    /// Read a single order.
    ///
    /// # Errors
    ///
    /// Returns not-found when absent, forbidden when the actor may not see
    /// it.
    pub async fn get_order(&self, actor: &Actor, id: &OrderId) -> Result<OrderDto, ServiceError> {
        let order = self.load(id).await?;
        if !AuthorizationEngine::can_access_order(actor, &order).is_allowed() {
            return Err(ServiceError::forbidden("not allowed to read this order"));
        }
        Ok(OrderDto::from_order(&order))
    }

    /// List orders visible to the actor.
    ///
    /// # Errors
    ///
    /// Returns forbidden when the supplied filter conflicts with the
    /// actor's forced ownership constraints.
    pub async fn list_orders(
        &self,
        actor: &Actor,
        filter: OrderFilter,
    ) -> Result<Vec<OrderDto>, ServiceError> {
        let query = AuthorizationEngine::narrow_order_filter(actor, filter)?;
        let orders = self.order_repo.query(&query).await?;
        Ok(orders.iter().map(OrderDto::from_order).collect())
    }

    /// Advance an order's operational status.
    ///
    /// Only adjacent forward transitions are accepted; `CANCELLED` is
    /// rejected here because cancellation has its own flow.
    ///
    /// # Errors
    ///
    /// Returns conflict for non-adjacent or terminal-origin transitions and
    /// when a concurrent write wins the race.
    pub async fn update_status(
        &self,
        actor: &Actor,
        id: &OrderId,
        target: OrderStatus,
    ) -> Result<OrderDto, ServiceError> {
        let order = self.load(id).await?;
        if !AuthorizationEngine::can_update_order(actor, &order).is_allowed() {
            return Err(ServiceError::forbidden("not allowed to update this order"));
        }
        if target == OrderStatus::Cancelled {
            return Err(ServiceError::validation(
                "orders are cancelled through the cancellation flow",
            ));
        }
        if !OrderStateMachine::is_valid_update_target(order.status(), target) {
            return Err(OrderError::InvalidStateTransition {
                from: order.status(),
                to: target,
                reason: OrderStateMachine::transition_error_reason(order.status(), target),
            }
            .into());
        }

        let mut updated = order.clone();
        updated.transition(target)?;
        let stored = self.order_repo.update(&updated, order.version()).await?;

        if target == OrderStatus::Confirmed {
            self.ensure_delivery(&stored).await?;
        }

        tracing::info!(order_id = %id, status = %target, "order status updated");
        Ok(OrderDto::from_order(&stored))
    }

    /// Advance a PENDING order to CONFIRMED after a settled payment.
    ///
    /// Webhook-driven: an order already past PENDING is left untouched, and
    /// losing a conditional write to a concurrent update simply re-reads
    /// and re-evaluates, so duplicate deliveries confirm exactly once.
    ///
    /// # Errors
    ///
    /// Returns error only on storage failure; an unknown order is
    /// acknowledged without error.
    pub async fn confirm_from_payment(&self, order_id: &OrderId) -> Result<(), ServiceError> {
        for _ in 0..CONFIRM_ATTEMPTS {
            let Some(order) = self.order_repo.find_by_id(order_id).await? else {
                tracing::warn!(order_id = %order_id, "payment settled for unknown order");
                return Ok(());
            };
            if order.status() != OrderStatus::Pending {
                return Ok(());
            }

            let mut updated = order.clone();
            updated.transition(OrderStatus::Confirmed)?;
            match self.order_repo.update(&updated, order.version()).await {
                Ok(stored) => {
                    self.ensure_delivery(&stored).await?;
                    tracing::info!(order_id = %order_id, "order confirmed by settled payment");
                    return Ok(());
                }
                Err(OrderError::VersionConflict { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
        // Every retry lost its race; whoever won has already moved the order.
        Ok(())
    }

    /// Advance the order when its delivery progresses, ignoring orders that
    /// are not at the expected stage.
    ///
    /// # Errors
    ///
    /// Returns error only on storage failure.
    pub async fn advance_for_delivery(
        &self,
        order_id: &OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), ServiceError> {
        for _ in 0..CONFIRM_ATTEMPTS {
            let Some(order) = self.order_repo.find_by_id(order_id).await? else {
                return Ok(());
            };
            if order.status() != from {
                return Ok(());
            }
            let mut updated = order.clone();
            updated.transition(to)?;
            match self.order_repo.update(&updated, order.version()).await {
                Ok(_) => {
                    tracing::info!(order_id = %order_id, status = %to, "order advanced by delivery");
                    return Ok(());
                }
                Err(OrderError::VersionConflict { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    async fn load(&self, id: &OrderId) -> Result<Order, ServiceError> {
        self.order_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| {
                OrderError::NotFound {
                    order_id: id.to_string(),
                }
                .into()
            })
    }

    /// Create the order's delivery once, on entry into CONFIRMED.
    async fn ensure_delivery(&self, order: &Order) -> Result<(), ServiceError> {
        if self
            .delivery_repo
            .find_by_order(order.id())
            .await
            .map_err(ServiceError::from)?
            .is_some()
        {
            return Ok(());
        }
        let delivery = Delivery::new(
            order.id().clone(),
            order.customer_id().clone(),
            order.restaurant_id().clone(),
        );
        self.delivery_repo.insert(&delivery).await?;
        tracing::info!(order_id = %order.id(), delivery_id = %delivery.id(), "delivery created");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::LineItemDto;
    use crate::application::ports::{InMemoryMenuCatalog, MenuItem};
    use crate::domain::authorization::Role;
    use crate::domain::shared::{ActorId, MenuItemId, Money, RestaurantId, TenantId};
    use crate::error::ErrorKind;
    use crate::infrastructure::persistence::InMemoryStore;
    use rust_decimal_macros::dec;

    fn service() -> OrderService<InMemoryStore, InMemoryStore, InMemoryMenuCatalog> {
        let store = Arc::new(InMemoryStore::new());
        let catalog = Arc::new(InMemoryMenuCatalog::new());
        catalog.add(MenuItem {
            id: MenuItemId::new("item-1"),
            restaurant_id: RestaurantId::new("rest-1"),
            unit_price: Money::new(dec!(10.00)),
        });
        catalog.add(MenuItem {
            id: MenuItemId::new("item-2"),
            restaurant_id: RestaurantId::new("rest-1"),
            unit_price: Money::new(dec!(5.00)),
        });
        OrderService::new(Arc::clone(&store), store, catalog)
    }

    fn customer() -> Actor {
        Actor::new(ActorId::new("cust-1"), Role::Customer, vec![])
    }

    fn staff() -> Actor {
        Actor::new(
            ActorId::new("staff-1"),
            Role::RestaurantStaff,
            vec![RestaurantId::new("rest-1")],
        )
    }

    fn create_request() -> CreateOrderRequest {
        CreateOrderRequest {
            restaurant_id: RestaurantId::new("rest-1"),
            tenant_id: TenantId::new("tenant-1"),
            line_items: vec![
                LineItemDto {
                    menu_item_id: MenuItemId::new("item-1"),
                    quantity: 1,
                    unit_price: Money::new(dec!(10.00)),
                },
                LineItemDto {
                    menu_item_id: MenuItemId::new("item-2"),
                    quantity: 1,
                    unit_price: Money::new(dec!(5.00)),
                },
            ],
            total: None,
        }
    }

    #[tokio::test]
    async fn create_order_computes_total() {
        let service = service();
        let dto = service.create_order(&customer(), create_request()).await.unwrap();
        assert_eq!(dto.total.amount(), dec!(15.00));
        assert_eq!(dto.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn create_order_rejects_total_mismatch() {
        let service = service();
        let mut request = create_request();
        request.total = Some(Money::new(dec!(12.00)));

        let err = service.create_order(&customer(), request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn create_order_rejects_unknown_menu_item() {
        let service = service();
        let mut request = create_request();
        request.line_items[0].menu_item_id = MenuItemId::new("no-such-item");

        let err = service.create_order(&customer(), request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn create_order_rejects_stale_price() {
        let service = service();
        let mut request = create_request();
        request.line_items[0].unit_price = Money::new(dec!(9.00));

        let err = service.create_order(&customer(), request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn create_order_denied_to_staff() {
        let service = service();
        let err = service.create_order(&staff(), create_request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn update_status_adjacent_only() {
        let service = service();
        let order = service.create_order(&customer(), create_request()).await.unwrap();

        // Skipping a stage is a conflict and leaves status unchanged.
        let err = service
            .update_status(&staff(), &order.id, OrderStatus::OutForDelivery)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let unchanged = service.get_order(&staff(), &order.id).await.unwrap();
        assert_eq!(unchanged.status, OrderStatus::Pending);

        let confirmed = service
            .update_status(&staff(), &order.id, OrderStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn update_status_rejects_cancelled_target() {
        let service = service();
        let order = service.create_order(&customer(), create_request()).await.unwrap();

        let err = service
            .update_status(&staff(), &order.id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn update_status_denied_to_customer() {
        let service = service();
        let order = service.create_order(&customer(), create_request()).await.unwrap();

        let err = service
            .update_status(&customer(), &order.id, OrderStatus::Confirmed)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn confirmation_creates_delivery_once() {
        let store = Arc::new(InMemoryStore::new());
        let catalog = Arc::new(InMemoryMenuCatalog::new());
        catalog.add(MenuItem {
            id: MenuItemId::new("item-1"),
            restaurant_id: RestaurantId::new("rest-1"),
            unit_price: Money::new(dec!(10.00)),
        });
        catalog.add(MenuItem {
            id: MenuItemId::new("item-2"),
            restaurant_id: RestaurantId::new("rest-1"),
            unit_price: Money::new(dec!(5.00)),
        });
        let service = OrderService::new(Arc::clone(&store), Arc::clone(&store), catalog);

        let order = service.create_order(&customer(), create_request()).await.unwrap();
        service.confirm_from_payment(&order.id).await.unwrap();
        // Replay of the settlement path must not create a second delivery.
        service.confirm_from_payment(&order.id).await.unwrap();

        let delivery = DeliveryRepository::find_by_order(store.as_ref(), &order.id)
            .await
            .unwrap();
        assert!(delivery.is_some());

        let confirmed = service.get_order(&staff(), &order.id).await.unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn confirm_from_payment_ignores_progressed_order() {
        let service = service();
        let order = service.create_order(&customer(), create_request()).await.unwrap();
        service
            .update_status(&staff(), &order.id, OrderStatus::Confirmed)
            .await
            .unwrap();
        service
            .update_status(&staff(), &order.id, OrderStatus::Preparing)
            .await
            .unwrap();

        service.confirm_from_payment(&order.id).await.unwrap();
        let current = service.get_order(&staff(), &order.id).await.unwrap();
        assert_eq!(current.status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn list_orders_scoped_to_customer() {
        let service = service();
        service.create_order(&customer(), create_request()).await.unwrap();

        let other = Actor::new(ActorId::new("cust-2"), Role::Customer, vec![]);
        let visible = service.list_orders(&other, OrderFilter::default()).await.unwrap();
        assert!(visible.is_empty());

        let own = service
            .list_orders(&customer(), OrderFilter::default())
            .await
            .unwrap();
        assert_eq!(own.len(), 1);
    }
}
