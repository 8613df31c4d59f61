//! Application ports: interfaces for external systems.

mod menu_catalog_port;
mod payment_gateway_port;

pub use menu_catalog_port::{InMemoryMenuCatalog, MenuCatalogPort, MenuItem};
pub use payment_gateway_port::{
    CheckoutSession, GatewayError, GatewayEvent, GatewayEventKind, PaymentGatewayPort,
    PaymentIntent, RefundAck,
};
