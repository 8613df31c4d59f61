//! Cancellation Service
//!
//! Validates eligibility, records the cancellation, cancels the order under
//! a conditional write, and kicks off the refund.

use std::sync::Arc;

use crate::application::dto::{CancellationDto, CreateCancellationRequest, UpdateCancellationRequest};
use crate::application::ports::{MenuCatalogPort, PaymentGatewayPort};
use crate::application::services::DeliveryService;
use crate::domain::authorization::{Actor, AuthorizationEngine};
use crate::domain::cancellation::aggregate::OrderCancellation;
use crate::domain::cancellation::errors::CancellationError;
use crate::domain::cancellation::query::CancellationFilter;
use crate::domain::cancellation::repository::CancellationRepository;
use crate::domain::delivery::repository::{DeliveryRepository, DriverRepository};
use crate::domain::ordering::errors::OrderError;
use crate::domain::ordering::repository::OrderRepository;
use crate::domain::ordering::value_objects::OrderStatus;
use crate::domain::payment::repository::PaymentRepository;
use crate::domain::payment::value_objects::PaymentStatus;
use crate::domain::shared::CancellationId;
use crate::error::ServiceError;

/// Service owning the cancellation flow.
pub struct CancellationService<C, O, P, D, V, M, G>
where
    C: CancellationRepository,
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort,
{
    cancellation_repo: Arc<C>,
    order_repo: Arc<O>,
    payment_repo: Arc<P>,
    delivery_service: Arc<DeliveryService<D, V, O, M, P>>,
    gateway: Arc<G>,
}

impl<C, O, P, D, V, M, G> CancellationService<C, O, P, D, V, M, G>
where
    C: CancellationRepository,
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
{
    /// Create a new CancellationService.
    pub fn new(
        cancellation_repo: Arc<C>,
        order_repo: Arc<O>,
        payment_repo: Arc<P>,
        delivery_service: Arc<DeliveryService<D, V, O, M, P>>,
        gateway: Arc<G>,
    ) -> Self {
        Self {
            cancellation_repo,
            order_repo,
            payment_repo,
            delivery_service,
            gateway,
        }
    }

    /// Request cancellation of an order.
    ///
    /// Eligibility is re-checked at write time through the conditional
    /// order update, so an order that progressed past PREPARING between the
    /// check and the write is reported as a conflict. A settled payment
    /// triggers an asynchronous gateway refund recorded as REQUESTED; the
    /// outcome arrives through the webhook path.
    ///
    /// # Errors
    ///
    /// Returns conflict for ineligible or already-cancelled orders and lost
    /// races.
    pub async fn request_cancellation(
        &self,
        actor: &Actor,
        request: CreateCancellationRequest,
    ) -> Result<CancellationDto, ServiceError> {
        let order_id = request.order_id;
        let order = self
            .order_repo
            .find_by_id(&order_id)
            .await?
            .ok_or_else(|| {
                ServiceError::from(OrderError::NotFound {
                    order_id: order_id.to_string(),
                })
            })?;

        if !AuthorizationEngine::can_cancel_order(actor, &order).is_allowed() {
            return Err(ServiceError::forbidden("not allowed to cancel this order"));
        }
        if order.status() == OrderStatus::Cancelled {
            return Err(CancellationError::AlreadyCancelled {
                order_id: order_id.to_string(),
            }
            .into());
        }
        if !order.status().is_cancellable() {
            return Err(CancellationError::NotEligible {
                order_id: order_id.to_string(),
                status: order.status(),
            }
            .into());
        }
        if self
            .cancellation_repo
            .find_by_order(&order_id)
            .await?
            .is_some()
        {
            return Err(CancellationError::AlreadyCancelled {
                order_id: order_id.to_string(),
            }
            .into());
        }

        // Cancel the order, conditioned on it still being in the eligible
        // status that was just checked.
        let mut cancelled = order.clone();
        cancelled.transition(OrderStatus::Cancelled)?;
        match self.order_repo.update(&cancelled, order.version()).await {
            Ok(_) => {}
            Err(OrderError::VersionConflict { .. }) => {
                return Err(ServiceError::conflict(
                    "order progressed past a cancellable status",
                ));
            }
            Err(e) => return Err(e.into()),
        }

        self.delivery_service.fail_for_order(&order_id).await?;

        let payments = self.payment_repo.find_by_order(&order_id).await?;
        let refundable = payments
            .iter()
            .find(|p| p.status() == PaymentStatus::Succeeded);

        let cancellation = match refundable {
            Some(_) => OrderCancellation::with_refund_requested(
                order_id.clone(),
                order.customer_id().clone(),
                order.restaurant_id().clone(),
                actor.id().clone(),
                request.reason,
            )?,
            None => OrderCancellation::without_refund(
                order_id.clone(),
                order.customer_id().clone(),
                order.restaurant_id().clone(),
                actor.id().clone(),
                request.reason,
            )?,
        };
        let stored = self.cancellation_repo.insert(&cancellation).await?;

        if let Some(payment) = refundable {
            let gateway = Arc::clone(&self.gateway);
            let gateway_ref = payment.gateway_ref().clone();
            let amount = payment.amount();
            let cancellation_id = stored.id().clone();
            // Fire-and-forget; the refund outcome is reconciled through the
            // webhook path like any other gateway event.
            tokio::spawn(async move {
                match gateway.create_refund(&gateway_ref, amount).await {
                    Ok(ack) => {
                        tracing::info!(
                            cancellation_id = %cancellation_id,
                            refund_ref = %ack.refund_ref,
                            "refund requested"
                        );
                    }
                    Err(e) => {
                        tracing::error!(
                            cancellation_id = %cancellation_id,
                            error = %e,
                            "refund request failed, awaiting operator retry"
                        );
                    }
                }
            });
        }

        tracing::info!(
            order_id = %order_id,
            cancellation_id = %stored.id(),
            refund_status = %stored.refund_status(),
            "order cancelled"
        );
        Ok(CancellationDto::from_cancellation(&stored))
    }

    /// Read a single cancellation.
    ///
    /// # Errors
    ///
    /// Returns not-found when absent, forbidden when the actor may not see
    /// it.
    pub async fn get_cancellation(
        &self,
        actor: &Actor,
        id: &CancellationId,
    ) -> Result<CancellationDto, ServiceError> {
        let cancellation = self.load(id).await?;
        if !AuthorizationEngine::can_access_cancellation(actor, &cancellation).is_allowed() {
            return Err(ServiceError::forbidden(
                "not allowed to read this cancellation",
            ));
        }
        Ok(CancellationDto::from_cancellation(&cancellation))
    }

    /// List cancellations visible to the actor.
    ///
    /// # Errors
    ///
    /// Returns forbidden when the supplied filter conflicts with the
    /// actor's forced ownership constraints.
    pub async fn list_cancellations(
        &self,
        actor: &Actor,
        filter: CancellationFilter,
    ) -> Result<Vec<CancellationDto>, ServiceError> {
        let query = AuthorizationEngine::narrow_cancellation_filter(actor, filter)?;
        let cancellations = self.cancellation_repo.query(&query).await?;
        Ok(cancellations
            .iter()
            .map(CancellationDto::from_cancellation)
            .collect())
    }

    /// Update a cancellation's reason.
    ///
    /// # Errors
    ///
    /// Returns forbidden unless the actor requested the cancellation or is
    /// an operator.
    pub async fn update_cancellation(
        &self,
        actor: &Actor,
        id: &CancellationId,
        request: UpdateCancellationRequest,
    ) -> Result<CancellationDto, ServiceError> {
        let cancellation = self.load(id).await?;
        if !AuthorizationEngine::can_update_cancellation(actor, &cancellation).is_allowed() {
            return Err(ServiceError::forbidden(
                "not allowed to update this cancellation",
            ));
        }

        let mut updated = cancellation.clone();
        updated.update_reason(request.reason)?;
        let stored = self
            .cancellation_repo
            .update(&updated, cancellation.version())
            .await?;
        Ok(CancellationDto::from_cancellation(&stored))
    }

    async fn load(&self, id: &CancellationId) -> Result<OrderCancellation, ServiceError> {
        self.cancellation_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| {
                CancellationError::NotFound {
                    cancellation_id: id.to_string(),
                }
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::{CreateOrderRequest, LineItemDto};
    use crate::application::ports::{
        CheckoutSession, GatewayError, GatewayEvent, GatewayEventKind, InMemoryMenuCatalog,
        MenuItem, PaymentIntent, RefundAck,
    };
    use crate::application::services::{OrderService, PaymentService, WebhookOutcome};
    use crate::domain::authorization::Role;
    use crate::domain::cancellation::value_objects::{CancellationStatus, RefundStatus};
    use crate::domain::shared::{
        ActorId, Currency, EventId, GatewayRef, MenuItemId, Money, OrderId, RestaurantId, TenantId,
    };
    use crate::error::ErrorKind;
    use crate::infrastructure::persistence::InMemoryStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    // Mock gateway recording refund requests.
    struct MockGateway {
        refunds: Mutex<Vec<(GatewayRef, Money)>>,
    }

    impl MockGateway {
        fn new() -> Self {
            Self {
                refunds: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PaymentGatewayPort for MockGateway {
        async fn create_payment_intent(
            &self,
            order_id: &OrderId,
            _amount: Money,
            _currency: Currency,
        ) -> Result<PaymentIntent, GatewayError> {
            Ok(PaymentIntent {
                gateway_ref: GatewayRef::new(format!("pi_{order_id}")),
                client_secret: "cs_test".to_string(),
            })
        }

        async fn create_checkout_session(
            &self,
            order_id: &OrderId,
            _amount: Money,
            _currency: Currency,
        ) -> Result<CheckoutSession, GatewayError> {
            Ok(CheckoutSession {
                gateway_ref: GatewayRef::new(format!("cs_{order_id}")),
                redirect_url: "https://gateway.test/session".to_string(),
            })
        }

        async fn create_refund(
            &self,
            payment_ref: &GatewayRef,
            amount: Money,
        ) -> Result<RefundAck, GatewayError> {
            self.refunds
                .lock()
                .unwrap()
                .push((payment_ref.clone(), amount));
            Ok(RefundAck {
                refund_ref: GatewayRef::new(format!("re_{payment_ref}")),
            })
        }
    }

    type TestOrderService = OrderService<InMemoryStore, InMemoryStore, InMemoryMenuCatalog>;
    type TestPaymentService = PaymentService<
        InMemoryStore,
        InMemoryStore,
        InMemoryStore,
        InMemoryMenuCatalog,
        MockGateway,
        InMemoryStore,
    >;
    type TestDeliveryService = DeliveryService<
        InMemoryStore,
        InMemoryStore,
        InMemoryStore,
        InMemoryMenuCatalog,
        InMemoryStore,
    >;
    type TestCancellationService = CancellationService<
        InMemoryStore,
        InMemoryStore,
        InMemoryStore,
        InMemoryStore,
        InMemoryStore,
        InMemoryMenuCatalog,
        MockGateway,
    >;

    struct Fixture {
        gateway: Arc<MockGateway>,
        order_service: Arc<TestOrderService>,
        payment_service: TestPaymentService,
        service: TestCancellationService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let catalog = Arc::new(InMemoryMenuCatalog::new());
        catalog.add(MenuItem {
            id: MenuItemId::new("item-1"),
            restaurant_id: RestaurantId::new("rest-1"),
            unit_price: Money::new(dec!(15.00)),
        });
        let gateway = Arc::new(MockGateway::new());
        let order_service = Arc::new(OrderService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            catalog,
        ));
        let delivery_service: Arc<TestDeliveryService> = Arc::new(DeliveryService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&order_service),
            Arc::clone(&store),
        ));
        let payment_service = PaymentService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&order_service),
            Arc::clone(&gateway),
            Arc::clone(&store),
        );
        let service = CancellationService::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&store),
            delivery_service,
            Arc::clone(&gateway),
        );
        Fixture {
            gateway,
            order_service,
            payment_service,
            service,
        }
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

    async fn place_order(fixture: &Fixture) -> OrderId {
        fixture
            .order_service
            .create_order(
                &customer(),
                CreateOrderRequest {
                    restaurant_id: RestaurantId::new("rest-1"),
                    tenant_id: TenantId::new("tenant-1"),
                    line_items: vec![LineItemDto {
                        menu_item_id: MenuItemId::new("item-1"),
                        quantity: 1,
                        unit_price: Money::new(dec!(15.00)),
                    }],
                    total: None,
                },
            )
            .await
            .unwrap()
            .id
    }

    fn cancel_request(order_id: &OrderId) -> CreateCancellationRequest {
        CreateCancellationRequest {
            order_id: order_id.clone(),
            reason: "changed my mind".to_string(),
        }
    }

    #[tokio::test]
    async fn cancel_pending_order_without_payment() {
        let fixture = fixture();
        let order_id = place_order(&fixture).await;

        let dto = fixture
            .service
            .request_cancellation(&customer(), cancel_request(&order_id))
            .await
            .unwrap();
        assert_eq!(dto.status, CancellationStatus::Completed);
        assert_eq!(dto.refund_status, RefundStatus::NotRequired);
    }

    #[tokio::test]
    async fn duplicate_cancellation_rejected() {
        let fixture = fixture();
        let order_id = place_order(&fixture).await;

        fixture
            .service
            .request_cancellation(&customer(), cancel_request(&order_id))
            .await
            .unwrap();
        let err = fixture
            .service
            .request_cancellation(&customer(), cancel_request(&order_id))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn delivered_order_not_cancellable() {
        let fixture = fixture();
        let order_id = place_order(&fixture).await;

        // Walk the order to DELIVERED through the normal chain.
        for status in [
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ] {
            fixture
                .order_service
                .update_status(&staff(), &order_id, status)
                .await
                .unwrap();
        }

        let err = fixture
            .service
            .request_cancellation(&customer(), cancel_request(&order_id))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        // No cancellation row was created.
        let list = fixture
            .service
            .list_cancellations(&customer(), CancellationFilter::default())
            .await
            .unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn settled_payment_triggers_refund_request() {
        let fixture = fixture();
        let order_id = place_order(&fixture).await;
        let intent = fixture
            .payment_service
            .create_payment_intent(&customer(), &order_id)
            .await
            .unwrap();
        fixture
            .payment_service
            .process_event(GatewayEvent {
                id: EventId::new("evt-pay"),
                kind: GatewayEventKind::PaymentSucceeded,
                payment_ref: intent.gateway_ref.clone(),
            })
            .await
            .unwrap();

        let dto = fixture
            .service
            .request_cancellation(&customer(), cancel_request(&order_id))
            .await
            .unwrap();
        assert_eq!(dto.status, CancellationStatus::Processing);
        assert_eq!(dto.refund_status, RefundStatus::Requested);

        // The refund call is spawned; let it run.
        tokio::task::yield_now().await;
        let refunds = fixture.gateway.refunds.lock().unwrap().clone();
        assert_eq!(refunds.len(), 1);
        assert_eq!(refunds[0].0, intent.gateway_ref);
        assert_eq!(refunds[0].1.amount(), dec!(15.00));
    }

    #[tokio::test]
    async fn refund_webhook_completes_cancellation() {
        let fixture = fixture();
        let order_id = place_order(&fixture).await;
        let intent = fixture
            .payment_service
            .create_payment_intent(&customer(), &order_id)
            .await
            .unwrap();
        fixture
            .payment_service
            .process_event(GatewayEvent {
                id: EventId::new("evt-pay"),
                kind: GatewayEventKind::PaymentSucceeded,
                payment_ref: intent.gateway_ref.clone(),
            })
            .await
            .unwrap();
        let cancellation = fixture
            .service
            .request_cancellation(&customer(), cancel_request(&order_id))
            .await
            .unwrap();

        let outcome = fixture
            .payment_service
            .process_event(GatewayEvent {
                id: EventId::new("evt-refund"),
                kind: GatewayEventKind::RefundCompleted,
                payment_ref: intent.gateway_ref.clone(),
            })
            .await
            .unwrap();
        assert_eq!(outcome, WebhookOutcome::Applied);

        let settled = fixture
            .service
            .get_cancellation(&customer(), &cancellation.id)
            .await
            .unwrap();
        assert_eq!(settled.refund_status, RefundStatus::Completed);
        assert_eq!(settled.status, CancellationStatus::Completed);

        // Redelivery of the refund event is a no-op.
        let replay = fixture
            .payment_service
            .process_event(GatewayEvent {
                id: EventId::new("evt-refund"),
                kind: GatewayEventKind::RefundCompleted,
                payment_ref: intent.gateway_ref,
            })
            .await
            .unwrap();
        assert_eq!(replay, WebhookOutcome::Duplicate);
    }

    #[tokio::test]
    async fn stranger_cannot_cancel() {
        let fixture = fixture();
        let order_id = place_order(&fixture).await;

        let stranger = Actor::new(ActorId::new("cust-2"), Role::Customer, vec![]);
        let err = fixture
            .service
            .request_cancellation(&stranger, cancel_request(&order_id))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn update_reason_restricted_to_requester() {
        let fixture = fixture();
        let order_id = place_order(&fixture).await;
        let cancellation = fixture
            .service
            .request_cancellation(&customer(), cancel_request(&order_id))
            .await
            .unwrap();

        let updated = fixture
            .service
            .update_cancellation(
                &customer(),
                &cancellation.id,
                UpdateCancellationRequest {
                    reason: "ordered twice by accident".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.reason, "ordered twice by accident");

        let err = fixture
            .service
            .update_cancellation(
                &staff(),
                &cancellation.id,
                UpdateCancellationRequest {
                    reason: "staff note".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }
}
