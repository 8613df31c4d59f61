//! Authenticated actors and roles.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::{ActorId, CustomerId, DriverId, RestaurantId};

/// Role of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Places orders and may cancel their own.
    Customer,
    /// Operates one or more restaurants' order flow.
    RestaurantStaff,
    /// Owns one or more restaurants.
    RestaurantOwner,
    /// Marketplace operator.
    Admin,
    /// Marketplace operator with tenant-wide reach.
    SuperAdmin,
    /// Delivers orders.
    Driver,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer => write!(f, "CUSTOMER"),
            Self::RestaurantStaff => write!(f, "RESTAURANT_STAFF"),
            Self::RestaurantOwner => write!(f, "RESTAURANT_OWNER"),
            Self::Admin => write!(f, "ADMIN"),
            Self::SuperAdmin => write!(f, "SUPER_ADMIN"),
            Self::Driver => write!(f, "DRIVER"),
        }
    }
}

/// An authenticated caller: identity, role and (for restaurant roles) the
/// restaurants the caller operates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    id: ActorId,
    role: Role,
    #[serde(default)]
    restaurant_ids: Vec<RestaurantId>,
}

impl Actor {
    /// Create an actor.
    #[must_use]
    pub const fn new(id: ActorId, role: Role, restaurant_ids: Vec<RestaurantId>) -> Self {
        Self {
            id,
            role,
            restaurant_ids,
        }
    }

    /// Actor identity.
    #[must_use]
    pub const fn id(&self) -> &ActorId {
        &self.id
    }

    /// Actor role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Restaurants this actor operates.
    #[must_use]
    pub fn restaurant_ids(&self) -> &[RestaurantId] {
        &self.restaurant_ids
    }

    /// True for marketplace operators.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin | Role::SuperAdmin)
    }

    /// True for restaurant staff or owners.
    #[must_use]
    pub const fn is_restaurant_role(&self) -> bool {
        matches!(self.role, Role::RestaurantStaff | Role::RestaurantOwner)
    }

    /// Whether this actor operates the given restaurant.
    #[must_use]
    pub fn operates_restaurant(&self, restaurant_id: &RestaurantId) -> bool {
        self.is_restaurant_role() && self.restaurant_ids.contains(restaurant_id)
    }

    /// Whether this actor is the given customer.
    #[must_use]
    pub fn is_customer(&self, customer_id: &CustomerId) -> bool {
        self.role == Role::Customer && self.id.as_str() == customer_id.as_str()
    }

    /// Whether this actor is the given driver.
    #[must_use]
    pub fn is_driver(&self, driver_id: &DriverId) -> bool {
        self.role == Role::Driver && self.id.as_str() == driver_id.as_str()
    }

    /// The actor's identity as a customer id (for forced filters).
    #[must_use]
    pub fn as_customer_id(&self) -> CustomerId {
        CustomerId::new(self.id.as_str())
    }

    /// The actor's identity as a driver id (for forced filters).
    #[must_use]
    pub fn as_driver_id(&self) -> DriverId {
        DriverId::new(self.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_roles() {
        let admin = Actor::new(ActorId::new("a-1"), Role::Admin, vec![]);
        let sa = Actor::new(ActorId::new("a-2"), Role::SuperAdmin, vec![]);
        let cust = Actor::new(ActorId::new("c-1"), Role::Customer, vec![]);
        assert!(admin.is_admin());
        assert!(sa.is_admin());
        assert!(!cust.is_admin());
    }

    #[test]
    fn operates_restaurant_requires_restaurant_role() {
        let staff = Actor::new(
            ActorId::new("s-1"),
            Role::RestaurantStaff,
            vec![RestaurantId::new("rest-1")],
        );
        assert!(staff.operates_restaurant(&RestaurantId::new("rest-1")));
        assert!(!staff.operates_restaurant(&RestaurantId::new("rest-2")));

        // Same membership list, wrong role.
        let cust = Actor::new(
            ActorId::new("c-1"),
            Role::Customer,
            vec![RestaurantId::new("rest-1")],
        );
        assert!(!cust.operates_restaurant(&RestaurantId::new("rest-1")));
    }

    #[test]
    fn identity_checks_respect_role() {
        let cust = Actor::new(ActorId::new("u-1"), Role::Customer, vec![]);
        assert!(cust.is_customer(&CustomerId::new("u-1")));
        assert!(!cust.is_customer(&CustomerId::new("u-2")));
        assert!(!cust.is_driver(&DriverId::new("u-1")));

        let driver = Actor::new(ActorId::new("u-1"), Role::Driver, vec![]);
        assert!(driver.is_driver(&DriverId::new("u-1")));
        assert!(!driver.is_customer(&CustomerId::new("u-1")));
    }

    #[test]
    fn role_serde() {
        assert_eq!(
            serde_json::to_string(&Role::RestaurantOwner).unwrap(),
            "\"RESTAURANT_OWNER\""
        );
        let parsed: Role = serde_json::from_str("\"SUPER_ADMIN\"").unwrap();
        assert_eq!(parsed, Role::SuperAdmin);
    }
}
