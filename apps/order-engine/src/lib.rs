// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! Order Engine - Rust Core Library
//!
//! Order lifecycle, payment reconciliation and role-based authorization
//! core for the restaurant marketplace.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside -> outside)
//!
//! - **Domain**: Core business logic (aggregates, value objects, state
//!   machines, repository ports)
//!   - `ordering`: Order aggregate and its fulfillment chain
//!   - `payment`: Payment aggregate, gateway event idempotency
//!   - `delivery`: Delivery/Driver aggregates, atomic assignment
//!   - `cancellation`: Cancellation records gating refunds
//!   - `authorization`: pure access decisions and list-filter narrowing
//!
//! - **Application**: Orchestration
//!   - `ports`: `PaymentGatewayPort`, `MenuCatalogPort`
//!   - `services`: `OrderService`, `PaymentService`, `DeliveryService`,
//!     `CancellationService`
//!   - `dto`: Data transfer objects for API boundaries
//!
//! - **Infrastructure**: Adapters
//!   - `http`: axum REST surface, signature-verified webhook route
//!   - `gateway`: reqwest payment-gateway adapter with bounded retries
//!   - `persistence`: in-memory store with versioned conditional writes
//!   - `auth`: bearer-token actor resolution

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Services, ports and DTOs.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// Service error taxonomy shared across layers.
pub mod error;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::authorization::{Access, Actor, AuthorizationEngine, Role};
pub use domain::cancellation::value_objects::{CancellationStatus, RefundStatus};
pub use domain::delivery::value_objects::{DeliveryStatus, DriverAvailability};
pub use domain::ordering::value_objects::OrderStatus;
pub use domain::payment::value_objects::PaymentStatus;
pub use domain::shared::{Currency, Money, OrderId};

// Application re-exports
pub use application::ports::{InMemoryMenuCatalog, MenuCatalogPort, MenuItem, PaymentGatewayPort};
pub use application::services::{
    CancellationService, DeliveryService, OrderService, PaymentService, WebhookOutcome,
};

// Infrastructure re-exports
pub use error::{ErrorKind, ServiceError};
pub use infrastructure::auth::{Authenticator, StaticTokenAuthenticator};
pub use infrastructure::gateway::{GatewayConfig, HttpPaymentGateway, sign_payload};
pub use infrastructure::http::{AppState, SIGNATURE_HEADER, create_router};
pub use infrastructure::persistence::InMemoryStore;
