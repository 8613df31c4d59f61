//! Strongly-typed identifiers for domain entities.
//!
//! These prevent mixing up IDs from different contexts.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from a string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generate a new unique identifier using UUID v4.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the inner string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(OrderId, "Unique identifier for an order.");
define_id!(CustomerId, "Identifier for the customer who placed an order.");
define_id!(RestaurantId, "Identifier for a restaurant fulfilling orders.");
define_id!(TenantId, "Identifier for the owning marketplace tenant.");
define_id!(MenuItemId, "Identifier for a menu item referenced by a line item.");
define_id!(PaymentId, "Unique identifier for a payment.");
define_id!(GatewayRef, "Payment gateway's reference for a payment object.");
define_id!(EventId, "Gateway webhook event identifier, used as idempotency key.");
define_id!(DeliveryId, "Unique identifier for a delivery.");
define_id!(DriverId, "Unique identifier for a driver.");
define_id!(CancellationId, "Unique identifier for an order cancellation.");
define_id!(ActorId, "Identifier of an authenticated caller.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_new_and_display() {
        let id = OrderId::new("ord-123");
        assert_eq!(id.as_str(), "ord-123");
        assert_eq!(format!("{id}"), "ord-123");
    }

    #[test]
    fn order_id_generate_is_unique() {
        let id1 = OrderId::generate();
        let id2 = OrderId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn ids_from_str_and_string() {
        let id: PaymentId = "pay-1".into();
        assert_eq!(id.as_str(), "pay-1");

        let id: DriverId = String::from("drv-2").into();
        assert_eq!(id.as_str(), "drv-2");
    }

    #[test]
    fn gateway_ref_into_inner() {
        let gw = GatewayRef::new("pi_abc123");
        assert_eq!(gw.into_inner(), "pi_abc123");
    }

    #[test]
    fn serde_roundtrip() {
        let id = EventId::new("evt-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"evt-1\"");

        let parsed: EventId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn hash_works_for_collections() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(EventId::new("evt-1"));
        set.insert(EventId::new("evt-2"));
        set.insert(EventId::new("evt-1")); // duplicate

        assert_eq!(set.len(), 2);
    }
}
