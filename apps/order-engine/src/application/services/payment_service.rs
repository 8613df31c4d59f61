//! Payment Service
//!
//! Two entry points: initiation (payment intents, hosted checkout sessions)
//! and webhook reconciliation. Reconciliation is the only path that moves a
//! payment to a terminal state.

use std::sync::Arc;

use crate::application::dto::{CheckoutSessionDto, PaymentDto, PaymentIntentDto};
use crate::application::ports::{
    GatewayEvent, GatewayEventKind, MenuCatalogPort, PaymentGatewayPort,
};
use crate::application::services::OrderService;
use crate::domain::authorization::{Actor, AuthorizationEngine};
use crate::domain::cancellation::repository::CancellationRepository;
use crate::domain::delivery::repository::DeliveryRepository;
use crate::domain::ordering::aggregate::Order;
use crate::domain::ordering::errors::OrderError;
use crate::domain::ordering::repository::OrderRepository;
use crate::domain::ordering::value_objects::OrderStatus;
use crate::domain::payment::aggregate::{EventApplication, Payment};
use crate::domain::payment::errors::PaymentError;
use crate::domain::payment::repository::PaymentRepository;
use crate::domain::payment::value_objects::PaymentStatus;
use crate::domain::shared::{Currency, Money, OrderId};
use crate::error::ServiceError;

/// Bounded retries for conditional writes racing concurrent webhook
/// deliveries.
const RECONCILE_ATTEMPTS: usize = 5;

/// How webhook processing ended; every variant is acknowledged with 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The event changed local state.
    Applied,
    /// This exact event id was processed before.
    Duplicate,
    /// The event was recognized but had no effect (terminal redelivery,
    /// refund for an unknown cancellation).
    Ignored,
    /// The referenced gateway object is unknown locally.
    UnknownReference,
}

/// Service creating gateway payments and reconciling webhook events.
pub struct PaymentService<P, O, D, M, G, C>
where
    P: PaymentRepository,
    O: OrderRepository,
    D: DeliveryRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort,
    C: CancellationRepository,
{
    payment_repo: Arc<P>,
    order_repo: Arc<O>,
    order_service: Arc<OrderService<O, D, M>>,
    gateway: Arc<G>,
    cancellation_repo: Arc<C>,
}

impl<P, O, D, M, G, C> PaymentService<P, O, D, M, G, C>
where
    P: PaymentRepository,
    O: OrderRepository,
    D: DeliveryRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort,
    C: CancellationRepository,
{
    /// Create a new PaymentService.
    pub fn new(
        payment_repo: Arc<P>,
        order_repo: Arc<O>,
        order_service: Arc<OrderService<O, D, M>>,
        gateway: Arc<G>,
        cancellation_repo: Arc<C>,
    ) -> Self {
        Self {
            payment_repo,
            order_repo,
            order_service,
            gateway,
            cancellation_repo,
        }
    }

    /// Create a gateway payment intent for the order's outstanding balance.
    ///
    /// The amount is recomputed from stored state at the instant of the
    /// call, never trusted from the request. The local payment row is only
    /// written after the gateway responded, so a timed-out call leaves
    /// nothing behind.
    ///
    /// # Errors
    ///
    /// Returns validation/conflict errors for unpayable orders, gateway
    /// errors when the gateway is unreachable after bounded retries.
    pub async fn create_payment_intent(
        &self,
        actor: &Actor,
        order_id: &OrderId,
    ) -> Result<PaymentIntentDto, ServiceError> {
        let (order, outstanding) = self.validate_initiation(actor, order_id).await?;
        let intent = self
            .gateway
            .create_payment_intent(order.id(), outstanding, Currency::Usd)
            .await?;

        let payment = Payment::new(
            order.id().clone(),
            outstanding,
            Currency::Usd,
            intent.gateway_ref.clone(),
        )?;
        let stored = self.payment_repo.insert(&payment).await?;
        tracing::info!(
            order_id = %order_id,
            payment_id = %stored.id(),
            amount = %outstanding,
            "payment intent created"
        );

        Ok(PaymentIntentDto {
            payment_id: stored.id().clone(),
            order_id: order_id.clone(),
            gateway_ref: intent.gateway_ref,
            client_secret: intent.client_secret,
            amount: outstanding,
            currency: Currency::Usd,
            status: stored.status(),
        })
    }

    /// Create a hosted checkout session for the order's outstanding balance.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_payment_intent`].
    pub async fn create_checkout_session(
        &self,
        actor: &Actor,
        order_id: &OrderId,
    ) -> Result<CheckoutSessionDto, ServiceError> {
        let (order, outstanding) = self.validate_initiation(actor, order_id).await?;
        let session = self
            .gateway
            .create_checkout_session(order.id(), outstanding, Currency::Usd)
            .await?;

        let payment = Payment::new(
            order.id().clone(),
            outstanding,
            Currency::Usd,
            session.gateway_ref.clone(),
        )?;
        let stored = self.payment_repo.insert(&payment).await?;
        tracing::info!(
            order_id = %order_id,
            payment_id = %stored.id(),
            amount = %outstanding,
            "checkout session created"
        );

        Ok(CheckoutSessionDto {
            payment_id: stored.id().clone(),
            order_id: order_id.clone(),
            gateway_ref: session.gateway_ref,
            redirect_url: session.redirect_url,
            amount: outstanding,
            currency: Currency::Usd,
            status: stored.status(),
        })
    }

    /// List the payments recorded for an order.
    ///
    /// # Errors
    ///
    /// Returns not-found when the order is absent, forbidden when the
    /// actor may not see it.
    pub async fn list_payments(
        &self,
        actor: &Actor,
        order_id: &OrderId,
    ) -> Result<Vec<PaymentDto>, ServiceError> {
        let order = self
            .order_repo
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| {
                ServiceError::from(OrderError::NotFound {
                    order_id: order_id.to_string(),
                })
            })?;
        if !AuthorizationEngine::can_access_order(actor, &order).is_allowed() {
            return Err(ServiceError::forbidden("not allowed to read this order"));
        }
        let payments = self.payment_repo.find_by_order(order_id).await?;
        Ok(payments.iter().map(PaymentDto::from_payment).collect())
    }

    /// Reconcile a signature-verified gateway event into local state.
    ///
    /// Duplicate deliveries are detected by event id; all writes are
    /// conditional on the state they were computed from and retried after
    /// losing a race, so concurrent deliveries of the same event settle to
    /// exactly one application.
    ///
    /// # Errors
    ///
    /// Returns error only for storage failures; business no-ops are
    /// reported through [`WebhookOutcome`].
    pub async fn process_event(&self, event: GatewayEvent) -> Result<WebhookOutcome, ServiceError> {
        let Some(payment) = self
            .payment_repo
            .find_by_gateway_ref(&event.payment_ref)
            .await?
        else {
            tracing::warn!(
                event_id = %event.id,
                gateway_ref = %event.payment_ref,
                "webhook references unknown payment, acknowledging"
            );
            return Ok(WebhookOutcome::UnknownReference);
        };

        match event.kind {
            GatewayEventKind::PaymentSucceeded => {
                self.settle_payment(payment, &event, PaymentStatus::Succeeded)
                    .await
            }
            GatewayEventKind::PaymentFailed => {
                self.settle_payment(payment, &event, PaymentStatus::Failed)
                    .await
            }
            GatewayEventKind::RefundCompleted => self.settle_refund(payment, &event, true).await,
            GatewayEventKind::RefundFailed => self.settle_refund(payment, &event, false).await,
        }
    }

    /// Validate payability and compute the outstanding balance.
    async fn validate_initiation(
        &self,
        actor: &Actor,
        order_id: &OrderId,
    ) -> Result<(Order, Money), ServiceError> {
        let order = self
            .order_repo
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| {
                ServiceError::from(OrderError::NotFound {
                    order_id: order_id.to_string(),
                })
            })?;

        if !AuthorizationEngine::can_initiate_payment(actor, &order).is_allowed() {
            return Err(ServiceError::forbidden(
                "not allowed to pay for this order",
            ));
        }
        if !matches!(
            order.status(),
            OrderStatus::Pending | OrderStatus::Confirmed
        ) {
            return Err(ServiceError::validation(format!(
                "order is not payable while {}",
                order.status()
            )));
        }

        let payments = self.payment_repo.find_by_order(order_id).await?;
        if payments
            .iter()
            .any(|p| p.status() == PaymentStatus::Pending)
        {
            return Err(ServiceError::conflict(
                "a pending payment already exists for this order",
            ));
        }

        let settled: Money = payments
            .iter()
            .filter(|p| p.status().counts_toward_balance())
            .map(Payment::amount)
            .sum();
        let outstanding = order.total() - settled;
        if !outstanding.is_positive() {
            return Err(ServiceError::validation("order has no outstanding balance"));
        }

        Ok((order, outstanding))
    }

    /// Apply a terminal payment outcome, retrying lost conditional writes.
    async fn settle_payment(
        &self,
        mut payment: Payment,
        event: &GatewayEvent,
        outcome: PaymentStatus,
    ) -> Result<WebhookOutcome, ServiceError> {
        for _ in 0..RECONCILE_ATTEMPTS {
            let expected = payment.version();
            let mut updated = payment.clone();

            match updated.apply_event(event.id.clone(), outcome) {
                EventApplication::Duplicate => {
                    tracing::debug!(event_id = %event.id, "duplicate webhook event, acknowledging");
                    // Redeliveries re-run the idempotent downstream step.
                    if payment.status() == PaymentStatus::Succeeded {
                        self.order_service
                            .confirm_from_payment(payment.order_id())
                            .await?;
                    }
                    return Ok(WebhookOutcome::Duplicate);
                }
                EventApplication::Ignored => {
                    match self.payment_repo.update(&updated, expected).await {
                        Ok(_) => {
                            tracing::info!(
                                event_id = %event.id,
                                payment_id = %updated.id(),
                                "terminal redelivery recorded without effect"
                            );
                            return Ok(WebhookOutcome::Ignored);
                        }
                        Err(PaymentError::VersionConflict { .. }) => {}
                        Err(e) => return Err(e.into()),
                    }
                }
                EventApplication::Applied(status) => {
                    match self.payment_repo.update(&updated, expected).await {
                        Ok(stored) => {
                            tracing::info!(
                                event_id = %event.id,
                                payment_id = %stored.id(),
                                status = %status,
                                "payment settled"
                            );
                            if status == PaymentStatus::Succeeded {
                                self.order_service
                                    .confirm_from_payment(stored.order_id())
                                    .await?;
                            }
                            // A failed payment leaves the order untouched;
                            // cancellation is an explicit, separate action.
                            return Ok(WebhookOutcome::Applied);
                        }
                        Err(PaymentError::VersionConflict { .. }) => {}
                        Err(e) => return Err(e.into()),
                    }
                }
            }

            payment = match self
                .payment_repo
                .find_by_gateway_ref(&event.payment_ref)
                .await?
            {
                Some(p) => p,
                None => return Ok(WebhookOutcome::UnknownReference),
            };
        }

        Err(ServiceError::conflict(
            "payment reconciliation lost repeated conditional writes",
        ))
    }

    /// Record a refund outcome on the payment and settle the cancellation.
    async fn settle_refund(
        &self,
        mut payment: Payment,
        event: &GatewayEvent,
        succeeded: bool,
    ) -> Result<WebhookOutcome, ServiceError> {
        let mut recorded = false;
        let mut duplicate = false;
        for _ in 0..RECONCILE_ATTEMPTS {
            if payment.has_processed(&event.id) {
                tracing::debug!(event_id = %event.id, "duplicate refund event");
                // Settlement below no-ops when already done.
                recorded = true;
                duplicate = true;
                break;
            }
            let expected = payment.version();
            let mut updated = payment.clone();
            updated.record_event(event.id.clone());

            match self.payment_repo.update(&updated, expected).await {
                Ok(stored) => {
                    payment = stored;
                    recorded = true;
                    break;
                }
                Err(PaymentError::VersionConflict { .. }) => {
                    payment = match self
                        .payment_repo
                        .find_by_gateway_ref(&event.payment_ref)
                        .await?
                    {
                        Some(p) => p,
                        None => return Ok(WebhookOutcome::UnknownReference),
                    };
                }
                Err(e) => return Err(e.into()),
            }
        }
        if !recorded {
            return Err(ServiceError::conflict(
                "refund reconciliation lost repeated conditional writes",
            ));
        }

        let Some(mut cancellation) = self
            .cancellation_repo
            .find_by_order(payment.order_id())
            .await?
        else {
            tracing::warn!(
                event_id = %event.id,
                order_id = %payment.order_id(),
                "refund event without a cancellation record, acknowledging"
            );
            return Ok(WebhookOutcome::Ignored);
        };

        for _ in 0..RECONCILE_ATTEMPTS {
            let expected = cancellation.version();
            let mut updated = cancellation.clone();
            if !updated.settle_refund(succeeded) {
                return Ok(if duplicate {
                    WebhookOutcome::Duplicate
                } else {
                    WebhookOutcome::Ignored
                });
            }
            match self.cancellation_repo.update(&updated, expected).await {
                Ok(stored) => {
                    tracing::info!(
                        event_id = %event.id,
                        cancellation_id = %stored.id(),
                        refund_status = %stored.refund_status(),
                        "refund settled"
                    );
                    return Ok(WebhookOutcome::Applied);
                }
                Err(crate::domain::cancellation::errors::CancellationError::VersionConflict {
                    ..
                }) => {
                    cancellation = match self
                        .cancellation_repo
                        .find_by_order(payment.order_id())
                        .await?
                    {
                        Some(c) => c,
                        None => return Ok(WebhookOutcome::Ignored),
                    };
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServiceError::conflict(
            "refund reconciliation lost repeated conditional writes",
        ))
    }
}
