//! Order Engine Binary
//!
//! Starts the marketplace order engine.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-engine
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `GATEWAY_API_KEY`: Payment gateway API key
//! - `GATEWAY_WEBHOOK_SECRET`: Secret for webhook signature verification
//!
//! ## Optional
//! - `GATEWAY_BASE_URL`: Gateway API base URL (default: <https://api.gateway.example>)
//! - `HTTP_PORT`: HTTP server port (default: 8080)
//! - `AUTH_TOKENS`: Static bearer tokens, `token=ROLE:actor_id[:rest1|rest2]`,
//!   comma-separated (development only)
//! - `RUST_LOG`: Log level (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use order_engine::application::ports::InMemoryMenuCatalog;
use order_engine::application::services::{
    CancellationService, DeliveryService, OrderService, PaymentService,
};
use order_engine::domain::authorization::{Actor, Role};
use order_engine::domain::shared::{ActorId, RestaurantId};
use order_engine::infrastructure::auth::StaticTokenAuthenticator;
use order_engine::infrastructure::gateway::{GatewayConfig, HttpPaymentGateway};
use order_engine::infrastructure::http::{AppState, create_router};
use order_engine::infrastructure::persistence::InMemoryStore;
use tokio::net::TcpListener;
use tokio::signal;

/// Default HTTP server port.
const DEFAULT_HTTP_PORT: u16 = 8080;

/// Parsed configuration from environment variables.
struct EngineConfig {
    http_port: u16,
    gateway_base_url: String,
    gateway_api_key: String,
    webhook_secret: String,
    auth_tokens: Vec<(String, Actor)>,
}

/// Concrete type aliases for the wired service graph.
type ConcreteOrderService = OrderService<InMemoryStore, InMemoryStore, InMemoryMenuCatalog>;
type ConcretePaymentService = PaymentService<
    InMemoryStore,
    InMemoryStore,
    InMemoryStore,
    InMemoryMenuCatalog,
    HttpPaymentGateway,
    InMemoryStore,
>;
type ConcreteDeliveryService = DeliveryService<
    InMemoryStore,
    InMemoryStore,
    InMemoryStore,
    InMemoryMenuCatalog,
    InMemoryStore,
>;
type ConcreteCancellationService = CancellationService<
    InMemoryStore,
    InMemoryStore,
    InMemoryStore,
    InMemoryStore,
    InMemoryStore,
    InMemoryMenuCatalog,
    HttpPaymentGateway,
>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting Order Engine");

    let config = parse_config()?;
    tracing::info!(
        http_port = config.http_port,
        gateway = %config.gateway_base_url,
        "Configuration loaded"
    );

    let store = Arc::new(InMemoryStore::new());
    let menu_catalog = Arc::new(InMemoryMenuCatalog::new());
    tracing::warn!("Using in-memory persistence and menu catalog; state does not survive restarts");

    let gateway = Arc::new(
        HttpPaymentGateway::new(
            &GatewayConfig::new(
                config.gateway_base_url.clone(),
                config.gateway_api_key.clone(),
                config.webhook_secret.clone(),
            ),
        )
        .context("failed to build payment gateway client")?,
    );

    let order_service: Arc<ConcreteOrderService> = Arc::new(OrderService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&menu_catalog),
    ));
    let delivery_service: Arc<ConcreteDeliveryService> = Arc::new(DeliveryService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&order_service),
        Arc::clone(&store),
    ));
    let payment_service: Arc<ConcretePaymentService> = Arc::new(PaymentService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&order_service),
        Arc::clone(&gateway),
        Arc::clone(&store),
    ));
    let cancellation_service: Arc<ConcreteCancellationService> = Arc::new(CancellationService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&delivery_service),
        Arc::clone(&gateway),
    ));

    let mut authenticator = StaticTokenAuthenticator::new();
    for (token, actor) in config.auth_tokens {
        authenticator.insert(token, actor);
    }

    let state = AppState {
        order_service,
        payment_service,
        delivery_service,
        cancellation_service,
        authenticator: Arc::new(authenticator),
        webhook_secret: config.webhook_secret,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let router = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Order Engine stopped");
    Ok(())
}

/// Initialize tracing from `RUST_LOG`, defaulting to info.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Parse configuration from environment variables.
fn parse_config() -> anyhow::Result<EngineConfig> {
    let http_port = match std::env::var("HTTP_PORT") {
        Ok(value) => value.parse().context("HTTP_PORT must be a port number")?,
        Err(_) => DEFAULT_HTTP_PORT,
    };
    let gateway_base_url = std::env::var("GATEWAY_BASE_URL")
        .unwrap_or_else(|_| "https://api.gateway.example".to_string());
    let gateway_api_key =
        std::env::var("GATEWAY_API_KEY").context("GATEWAY_API_KEY is required")?;
    let webhook_secret =
        std::env::var("GATEWAY_WEBHOOK_SECRET").context("GATEWAY_WEBHOOK_SECRET is required")?;

    let auth_tokens = match std::env::var("AUTH_TOKENS") {
        Ok(value) => parse_auth_tokens(&value)?,
        Err(_) => Vec::new(),
    };

    Ok(EngineConfig {
        http_port,
        gateway_base_url,
        gateway_api_key,
        webhook_secret,
        auth_tokens,
    })
}

/// Parse `token=ROLE:actor_id[:rest1|rest2],...` into actor entries.
fn parse_auth_tokens(value: &str) -> anyhow::Result<Vec<(String, Actor)>> {
    let mut tokens = Vec::new();
    for entry in value.split(',').filter(|e| !e.trim().is_empty()) {
        let (token, descriptor) = entry
            .split_once('=')
            .with_context(|| format!("bad AUTH_TOKENS entry: {entry}"))?;
        let mut parts = descriptor.split(':');
        let role = match parts.next() {
            Some("CUSTOMER") => Role::Customer,
            Some("RESTAURANT_STAFF") => Role::RestaurantStaff,
            Some("RESTAURANT_OWNER") => Role::RestaurantOwner,
            Some("ADMIN") => Role::Admin,
            Some("SUPER_ADMIN") => Role::SuperAdmin,
            Some("DRIVER") => Role::Driver,
            other => anyhow::bail!("unknown role in AUTH_TOKENS: {other:?}"),
        };
        let actor_id = parts
            .next()
            .with_context(|| format!("missing actor id in AUTH_TOKENS entry: {entry}"))?;
        let restaurant_ids = parts
            .next()
            .map(|list| list.split('|').map(RestaurantId::new).collect())
            .unwrap_or_default();
        tokens.push((
            token.trim().to_string(),
            Actor::new(ActorId::new(actor_id), role, restaurant_ids),
        ));
    }
    Ok(tokens)
}

/// Wait for ctrl-c.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_tokens_parse() {
        let tokens = parse_auth_tokens(
            "tok-1=CUSTOMER:cust-1,tok-2=RESTAURANT_STAFF:staff-1:rest-1|rest-2",
        )
        .unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].0, "tok-1");
        assert_eq!(tokens[0].1.role(), Role::Customer);
        assert_eq!(tokens[1].1.restaurant_ids().len(), 2);
    }

    #[test]
    fn bad_auth_tokens_rejected() {
        assert!(parse_auth_tokens("no-equals-sign").is_err());
        assert!(parse_auth_tokens("tok=WIZARD:a-1").is_err());
    }
}
