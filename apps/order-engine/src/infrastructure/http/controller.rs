//! HTTP Controller (Driver Adapter)
//!
//! Axum-based REST API that authenticates the actor and delegates to the
//! application services. The gateway webhook endpoint is the one
//! unauthenticated route; it verifies the HMAC signature over the raw body
//! before anything is parsed.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::application::dto::{
    CreateCancellationRequest, CreateDriverRequest, CreateOrderRequest, UpdateCancellationRequest,
    UpdateDeliveryRequest, UpdateDriverRequest, UpdateOrderRequest,
};
use crate::application::ports::{MenuCatalogPort, PaymentGatewayPort};
use crate::application::services::{
    CancellationService, DeliveryService, OrderService, PaymentService,
};
use crate::domain::authorization::Actor;
use crate::domain::cancellation::query::CancellationFilter;
use crate::domain::cancellation::repository::CancellationRepository;
use crate::domain::delivery::query::DeliveryFilter;
use crate::domain::delivery::repository::{DeliveryRepository, DriverRepository};
use crate::domain::ordering::query::OrderFilter;
use crate::domain::ordering::repository::OrderRepository;
use crate::domain::payment::repository::PaymentRepository;
use crate::domain::shared::{CancellationId, DeliveryId, DriverId, OrderId};
use crate::error::ServiceError;
use crate::infrastructure::auth::Authenticator;
use crate::infrastructure::gateway::api_types::WebhookEnvelope;
use crate::infrastructure::gateway::verify_signature;

use super::response::{HealthResponse, WebhookAckResponse};

/// Header carrying the gateway's webhook signature.
pub const SIGNATURE_HEADER: &str = "Gateway-Signature";

/// Application state shared across handlers.
pub struct AppState<O, P, D, V, C, M, G, A>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort,
    A: Authenticator,
{
    /// Order lifecycle service.
    pub order_service: Arc<OrderService<O, D, M>>,
    /// Payment initiation and reconciliation service.
    pub payment_service: Arc<PaymentService<P, O, D, M, G, C>>,
    /// Delivery and driver service.
    pub delivery_service: Arc<DeliveryService<D, V, O, M, P>>,
    /// Cancellation service.
    pub cancellation_service: Arc<CancellationService<C, O, P, D, V, M, G>>,
    /// Bearer-token resolver.
    pub authenticator: Arc<A>,
    /// Secret for webhook signature verification.
    pub webhook_secret: String,
    /// Application version.
    pub version: String,
}

impl<O, P, D, V, C, M, G, A> Clone for AppState<O, P, D, V, C, M, G, A>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort,
    A: Authenticator,
{
    fn clone(&self) -> Self {
        Self {
            order_service: Arc::clone(&self.order_service),
            payment_service: Arc::clone(&self.payment_service),
            delivery_service: Arc::clone(&self.delivery_service),
            cancellation_service: Arc::clone(&self.cancellation_service),
            authenticator: Arc::clone(&self.authenticator),
            webhook_secret: self.webhook_secret.clone(),
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router<O, P, D, V, C, M, G, A>(state: AppState<O, P, D, V, C, M, G, A>) -> Router
where
    O: OrderRepository + 'static,
    P: PaymentRepository + 'static,
    D: DeliveryRepository + 'static,
    V: DriverRepository + 'static,
    C: CancellationRepository + 'static,
    M: MenuCatalogPort + 'static,
    G: PaymentGatewayPort + 'static,
    A: Authenticator + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/orders", get(list_orders).post(create_order))
        .route("/api/v1/orders/{id}", get(get_order).put(update_order))
        .route(
            "/api/v1/payments/{order_id}/payment-intent",
            get(list_payments).post(create_payment_intent),
        )
        .route(
            "/api/v1/payments/{order_id}/checkout-session",
            get(list_payments).post(create_checkout_session),
        )
        .route("/api/v1/payments/webhooks/gateway", post(gateway_webhook))
        .route("/api/v1/deliveries", get(list_deliveries))
        .route(
            "/api/v1/deliveries/{id}",
            get(get_delivery).put(update_delivery),
        )
        .route("/api/v1/drivers", get(list_drivers).post(create_driver))
        .route("/api/v1/drivers/{id}", put(update_driver))
        .route(
            "/api/v1/order-cancellations",
            get(list_cancellations).post(create_cancellation),
        )
        .route(
            "/api/v1/order-cancellations/{id}",
            get(get_cancellation).put(update_cancellation),
        )
        .with_state(state)
}

/// Resolve the calling actor from the Authorization header.
fn authenticate<A: Authenticator>(
    authenticator: &A,
    headers: &HeaderMap,
) -> Result<Actor, ServiceError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServiceError::unauthenticated("missing bearer token"))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ServiceError::unauthenticated("malformed authorization header"))?;
    authenticator
        .authenticate(token)
        .ok_or_else(|| ServiceError::unauthenticated("unknown or expired token"))
}

async fn health<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
) -> impl IntoResponse
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort,
    A: Authenticator,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

async fn create_order<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
    headers: HeaderMap,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Response, ServiceError>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
    A: Authenticator,
{
    let actor = authenticate(state.authenticator.as_ref(), &headers)?;
    let dto = state.order_service.create_order(&actor, request).await?;
    Ok((StatusCode::CREATED, Json(dto)).into_response())
}

async fn list_orders<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
    headers: HeaderMap,
    Query(filter): Query<OrderFilter>,
) -> Result<Response, ServiceError>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
    A: Authenticator,
{
    let actor = authenticate(state.authenticator.as_ref(), &headers)?;
    let orders = state.order_service.list_orders(&actor, filter).await?;
    Ok(Json(orders).into_response())
}

async fn get_order<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, ServiceError>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
    A: Authenticator,
{
    let actor = authenticate(state.authenticator.as_ref(), &headers)?;
    let dto = state
        .order_service
        .get_order(&actor, &OrderId::new(id))
        .await?;
    Ok(Json(dto).into_response())
}

async fn update_order<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<Response, ServiceError>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
    A: Authenticator,
{
    let actor = authenticate(state.authenticator.as_ref(), &headers)?;
    let dto = state
        .order_service
        .update_status(&actor, &OrderId::new(id), request.status)
        .await?;
    Ok(Json(dto).into_response())
}

async fn create_payment_intent<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> Result<Response, ServiceError>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
    A: Authenticator,
{
    let actor = authenticate(state.authenticator.as_ref(), &headers)?;
    let dto = state
        .payment_service
        .create_payment_intent(&actor, &OrderId::new(order_id))
        .await?;
    Ok((StatusCode::CREATED, Json(dto)).into_response())
}

async fn create_checkout_session<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> Result<Response, ServiceError>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
    A: Authenticator,
{
    let actor = authenticate(state.authenticator.as_ref(), &headers)?;
    let dto = state
        .payment_service
        .create_checkout_session(&actor, &OrderId::new(order_id))
        .await?;
    Ok((StatusCode::CREATED, Json(dto)).into_response())
}

async fn list_payments<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> Result<Response, ServiceError>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
    A: Authenticator,
{
    let actor = authenticate(state.authenticator.as_ref(), &headers)?;
    let payments = state
        .payment_service
        .list_payments(&actor, &OrderId::new(order_id))
        .await?;
    Ok(Json(payments).into_response())
}

/// Gateway webhook: unauthenticated, signature-verified over the raw body
/// before any parsing. Recognized-but-already-processed events are
/// acknowledged with 200; only storage trouble earns a non-2xx so the
/// gateway redelivers.
async fn gateway_webhook<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
    A: Authenticator,
{
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        return ServiceError::validation("missing webhook signature").into_response();
    };
    if let Err(e) = verify_signature(&state.webhook_secret, &body, signature) {
        tracing::warn!(error = %e, "webhook signature rejected");
        return ServiceError::validation("invalid webhook signature").into_response();
    }

    let envelope: WebhookEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, "malformed webhook payload");
            return ServiceError::validation("malformed webhook payload").into_response();
        }
    };
    let Some(event) = envelope.into_event() else {
        tracing::debug!("unconsumed webhook event type, acknowledging");
        return Json(WebhookAckResponse { received: true }).into_response();
    };

    match state.payment_service.process_event(event).await {
        Ok(outcome) => {
            tracing::debug!(?outcome, "webhook processed");
            Json(WebhookAckResponse { received: true }).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "webhook processing failed, inviting redelivery");
            e.into_response()
        }
    }
}

async fn list_deliveries<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
    headers: HeaderMap,
    Query(filter): Query<DeliveryFilter>,
) -> Result<Response, ServiceError>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
    A: Authenticator,
{
    let actor = authenticate(state.authenticator.as_ref(), &headers)?;
    let deliveries = state
        .delivery_service
        .list_deliveries(&actor, filter)
        .await?;
    Ok(Json(deliveries).into_response())
}

async fn get_delivery<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, ServiceError>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
    A: Authenticator,
{
    let actor = authenticate(state.authenticator.as_ref(), &headers)?;
    let dto = state
        .delivery_service
        .get_delivery(&actor, &DeliveryId::new(id))
        .await?;
    Ok(Json(dto).into_response())
}

async fn update_delivery<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<UpdateDeliveryRequest>,
) -> Result<Response, ServiceError>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
    A: Authenticator,
{
    let actor = authenticate(state.authenticator.as_ref(), &headers)?;
    let id = DeliveryId::new(id);
    let dto = match (request.driver_id, request.status) {
        (Some(driver_id), None) => {
            state
                .delivery_service
                .assign_driver(&actor, &id, &driver_id)
                .await?
        }
        (None, Some(status)) => {
            state
                .delivery_service
                .update_status(&actor, &id, status)
                .await?
        }
        _ => {
            return Err(ServiceError::validation(
                "provide exactly one of driver_id or status",
            ));
        }
    };
    Ok(Json(dto).into_response())
}

async fn list_drivers<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
    headers: HeaderMap,
) -> Result<Response, ServiceError>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
    A: Authenticator,
{
    let actor = authenticate(state.authenticator.as_ref(), &headers)?;
    let drivers = state.delivery_service.list_drivers(&actor).await?;
    Ok(Json(drivers).into_response())
}

async fn create_driver<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
    headers: HeaderMap,
    Json(request): Json<CreateDriverRequest>,
) -> Result<Response, ServiceError>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
    A: Authenticator,
{
    let actor = authenticate(state.authenticator.as_ref(), &headers)?;
    let dto = state.delivery_service.create_driver(&actor, request).await?;
    Ok((StatusCode::CREATED, Json(dto)).into_response())
}

async fn update_driver<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<UpdateDriverRequest>,
) -> Result<Response, ServiceError>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
    A: Authenticator,
{
    let actor = authenticate(state.authenticator.as_ref(), &headers)?;
    let dto = state
        .delivery_service
        .update_driver(&actor, &DriverId::new(id), request)
        .await?;
    Ok(Json(dto).into_response())
}

async fn create_cancellation<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
    headers: HeaderMap,
    Json(request): Json<CreateCancellationRequest>,
) -> Result<Response, ServiceError>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
    A: Authenticator,
{
    let actor = authenticate(state.authenticator.as_ref(), &headers)?;
    let dto = state
        .cancellation_service
        .request_cancellation(&actor, request)
        .await?;
    Ok((StatusCode::CREATED, Json(dto)).into_response())
}

async fn list_cancellations<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
    headers: HeaderMap,
    Query(filter): Query<CancellationFilter>,
) -> Result<Response, ServiceError>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
    A: Authenticator,
{
    let actor = authenticate(state.authenticator.as_ref(), &headers)?;
    let cancellations = state
        .cancellation_service
        .list_cancellations(&actor, filter)
        .await?;
    Ok(Json(cancellations).into_response())
}

async fn get_cancellation<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, ServiceError>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
    A: Authenticator,
{
    let actor = authenticate(state.authenticator.as_ref(), &headers)?;
    let dto = state
        .cancellation_service
        .get_cancellation(&actor, &CancellationId::new(id))
        .await?;
    Ok(Json(dto).into_response())
}

async fn update_cancellation<O, P, D, V, C, M, G, A>(
    State(state): State<AppState<O, P, D, V, C, M, G, A>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<UpdateCancellationRequest>,
) -> Result<Response, ServiceError>
where
    O: OrderRepository,
    P: PaymentRepository,
    D: DeliveryRepository,
    V: DriverRepository,
    C: CancellationRepository,
    M: MenuCatalogPort,
    G: PaymentGatewayPort + 'static,
    A: Authenticator,
{
    let actor = authenticate(state.authenticator.as_ref(), &headers)?;
    let dto = state
        .cancellation_service
        .update_cancellation(&actor, &CancellationId::new(id), request)
        .await?;
    Ok(Json(dto).into_response())
}
