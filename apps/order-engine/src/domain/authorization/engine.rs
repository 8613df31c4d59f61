//! Authorization Engine
//!
//! Pure decision and filter-narrowing logic. No side effects, no external
//! calls; unknown role/resource combinations default to Deny rather than
//! erroring.

use crate::domain::cancellation::aggregate::OrderCancellation;
use crate::domain::cancellation::query::{CancellationFilter, CancellationQuery};
use crate::domain::delivery::aggregate::{Delivery, Driver};
use crate::domain::delivery::query::{DeliveryFilter, DeliveryQuery};
use crate::domain::ordering::aggregate::Order;
use crate::domain::ordering::query::{OrderFilter, OrderQuery};

use super::actor::{Actor, Role};

/// Outcome of an access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The actor may perform the action.
    Allow,
    /// The actor may not perform the action.
    Deny,
}

impl Access {
    /// True when the decision is Allow.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    const fn from_bool(allowed: bool) -> Self {
        if allowed { Self::Allow } else { Self::Deny }
    }
}

/// Why a list filter was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDenial {
    /// The role may not run this list query at all.
    Role(Role),
    /// A caller-supplied field conflicts with the forced ownership
    /// constraint.
    ConflictingField {
        /// The offending filter field.
        field: &'static str,
    },
}

impl std::fmt::Display for FilterDenial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Role(role) => write!(f, "role {role} may not run this query"),
            Self::ConflictingField { field } => {
                write!(f, "filter field '{field}' conflicts with ownership constraints")
            }
        }
    }
}

/// Pure authorization decisions over actors and resources.
pub struct AuthorizationEngine;

impl AuthorizationEngine {
    // ------------------------------------------------------------------
    // Single-resource decisions
    // ------------------------------------------------------------------

    /// May the actor create orders? Customers place orders; operators and
    /// restaurant roles use their own surfaces.
    #[must_use]
    pub fn can_create_order(actor: &Actor) -> Access {
        Access::from_bool(actor.role() == Role::Customer)
    }

    /// May the actor read this order?
    #[must_use]
    pub fn can_access_order(actor: &Actor, order: &Order) -> Access {
        Access::from_bool(
            actor.is_admin()
                || actor.is_customer(order.customer_id())
                || actor.operates_restaurant(order.restaurant_id()),
        )
    }

    /// May the actor advance this order's operational status?
    #[must_use]
    pub fn can_update_order(actor: &Actor, order: &Order) -> Access {
        Access::from_bool(actor.is_admin() || actor.operates_restaurant(order.restaurant_id()))
    }

    /// May the actor request cancellation of this order? The eligibility
    /// window is a separate, status-based check.
    #[must_use]
    pub fn can_cancel_order(actor: &Actor, order: &Order) -> Access {
        Access::from_bool(
            actor.is_admin()
                || actor.is_customer(order.customer_id())
                || actor.operates_restaurant(order.restaurant_id()),
        )
    }

    /// May the actor initiate a payment for this order?
    #[must_use]
    pub fn can_initiate_payment(actor: &Actor, order: &Order) -> Access {
        Access::from_bool(actor.is_admin() || actor.is_customer(order.customer_id()))
    }

    /// May the actor read this delivery?
    #[must_use]
    pub fn can_access_delivery(actor: &Actor, delivery: &Delivery) -> Access {
        Access::from_bool(
            actor.is_admin()
                || actor.is_customer(delivery.customer_id())
                || actor.operates_restaurant(delivery.restaurant_id())
                || delivery.driver_id().is_some_and(|d| actor.is_driver(d)),
        )
    }

    /// May the actor advance this delivery's status?
    #[must_use]
    pub fn can_update_delivery(actor: &Actor, delivery: &Delivery) -> Access {
        Access::from_bool(
            actor.is_admin()
                || actor.operates_restaurant(delivery.restaurant_id())
                || delivery.driver_id().is_some_and(|d| actor.is_driver(d)),
        )
    }

    /// May the actor read this cancellation?
    #[must_use]
    pub fn can_access_cancellation(actor: &Actor, cancellation: &OrderCancellation) -> Access {
        Access::from_bool(
            actor.is_admin()
                || actor.is_customer(cancellation.customer_id())
                || actor.operates_restaurant(cancellation.restaurant_id()),
        )
    }

    /// May the actor update this cancellation's reason?
    #[must_use]
    pub fn can_update_cancellation(actor: &Actor, cancellation: &OrderCancellation) -> Access {
        Access::from_bool(actor.is_admin() || actor.id() == cancellation.requested_by())
    }

    /// May the actor register drivers?
    #[must_use]
    pub fn can_manage_drivers(actor: &Actor) -> Access {
        Access::from_bool(actor.is_admin())
    }

    /// May the actor list drivers?
    #[must_use]
    pub fn can_list_drivers(actor: &Actor) -> Access {
        Access::from_bool(actor.is_admin() || actor.is_restaurant_role())
    }

    /// May the actor update this driver record?
    #[must_use]
    pub fn can_update_driver(actor: &Actor, driver: &Driver) -> Access {
        Access::from_bool(actor.is_admin() || actor.is_driver(driver.id()))
    }

    // ------------------------------------------------------------------
    // List-query narrowing
    // ------------------------------------------------------------------

    /// Narrow an order list filter to what the actor may see.
    ///
    /// # Errors
    ///
    /// Returns [`FilterDenial`] when the role may not list orders or a
    /// supplied field conflicts with the forced ownership constraint.
    pub fn narrow_order_filter(
        actor: &Actor,
        filter: OrderFilter,
    ) -> Result<OrderQuery, FilterDenial> {
        match actor.role() {
            Role::Customer => {
                if filter
                    .customer_id
                    .as_ref()
                    .is_some_and(|c| !actor.is_customer(c))
                {
                    return Err(FilterDenial::ConflictingField {
                        field: "customer_id",
                    });
                }
                Ok(OrderQuery {
                    customer_id: Some(actor.as_customer_id()),
                    restaurant_ids: filter.restaurant_id.map(|r| vec![r]),
                    status: filter.status,
                })
            }
            Role::RestaurantStaff | Role::RestaurantOwner => {
                let restaurant_ids = narrow_restaurants(actor, filter.restaurant_id)?;
                Ok(OrderQuery {
                    customer_id: filter.customer_id,
                    restaurant_ids: Some(restaurant_ids),
                    status: filter.status,
                })
            }
            Role::Admin | Role::SuperAdmin => Ok(OrderQuery {
                customer_id: filter.customer_id,
                restaurant_ids: filter.restaurant_id.map(|r| vec![r]),
                status: filter.status,
            }),
            Role::Driver => Err(FilterDenial::Role(Role::Driver)),
        }
    }

    /// Narrow a delivery list filter to what the actor may see.
    ///
    /// # Errors
    ///
    /// Returns [`FilterDenial`] when a supplied field conflicts with the
    /// forced ownership constraint.
    pub fn narrow_delivery_filter(
        actor: &Actor,
        filter: DeliveryFilter,
    ) -> Result<DeliveryQuery, FilterDenial> {
        match actor.role() {
            Role::Customer => {
                if filter
                    .customer_id
                    .as_ref()
                    .is_some_and(|c| !actor.is_customer(c))
                {
                    return Err(FilterDenial::ConflictingField {
                        field: "customer_id",
                    });
                }
                Ok(DeliveryQuery {
                    order_id: filter.order_id,
                    customer_id: Some(actor.as_customer_id()),
                    restaurant_ids: filter.restaurant_id.map(|r| vec![r]),
                    driver_id: filter.driver_id,
                    status: filter.status,
                })
            }
            Role::RestaurantStaff | Role::RestaurantOwner => {
                let restaurant_ids = narrow_restaurants(actor, filter.restaurant_id)?;
                Ok(DeliveryQuery {
                    order_id: filter.order_id,
                    customer_id: filter.customer_id,
                    restaurant_ids: Some(restaurant_ids),
                    driver_id: filter.driver_id,
                    status: filter.status,
                })
            }
            Role::Driver => {
                if filter
                    .driver_id
                    .as_ref()
                    .is_some_and(|d| !actor.is_driver(d))
                {
                    return Err(FilterDenial::ConflictingField { field: "driver_id" });
                }
                Ok(DeliveryQuery {
                    order_id: filter.order_id,
                    customer_id: filter.customer_id,
                    restaurant_ids: filter.restaurant_id.map(|r| vec![r]),
                    driver_id: Some(actor.as_driver_id()),
                    status: filter.status,
                })
            }
            Role::Admin | Role::SuperAdmin => Ok(DeliveryQuery {
                order_id: filter.order_id,
                customer_id: filter.customer_id,
                restaurant_ids: filter.restaurant_id.map(|r| vec![r]),
                driver_id: filter.driver_id,
                status: filter.status,
            }),
        }
    }

    /// Narrow a cancellation list filter to what the actor may see.
    ///
    /// # Errors
    ///
    /// Returns [`FilterDenial`] when the role may not list cancellations or
    /// a supplied field conflicts with the forced ownership constraint.
    pub fn narrow_cancellation_filter(
        actor: &Actor,
        filter: CancellationFilter,
    ) -> Result<CancellationQuery, FilterDenial> {
        match actor.role() {
            Role::Customer => {
                if filter
                    .customer_id
                    .as_ref()
                    .is_some_and(|c| !actor.is_customer(c))
                {
                    return Err(FilterDenial::ConflictingField {
                        field: "customer_id",
                    });
                }
                Ok(CancellationQuery {
                    order_id: filter.order_id,
                    customer_id: Some(actor.as_customer_id()),
                    restaurant_ids: filter.restaurant_id.map(|r| vec![r]),
                    status: filter.status,
                })
            }
            Role::RestaurantStaff | Role::RestaurantOwner => {
                let restaurant_ids = narrow_restaurants(actor, filter.restaurant_id)?;
                Ok(CancellationQuery {
                    order_id: filter.order_id,
                    customer_id: filter.customer_id,
                    restaurant_ids: Some(restaurant_ids),
                    status: filter.status,
                })
            }
            Role::Admin | Role::SuperAdmin => Ok(CancellationQuery {
                order_id: filter.order_id,
                customer_id: filter.customer_id,
                restaurant_ids: filter.restaurant_id.map(|r| vec![r]),
                status: filter.status,
            }),
            Role::Driver => Err(FilterDenial::Role(Role::Driver)),
        }
    }
}

/// Restrict a restaurant filter to the restaurants the actor operates; a
/// supplied restaurant outside that set is a conflict.
fn narrow_restaurants(
    actor: &Actor,
    supplied: Option<crate::domain::shared::RestaurantId>,
) -> Result<Vec<crate::domain::shared::RestaurantId>, FilterDenial> {
    match supplied {
        Some(restaurant_id) => {
            if actor.operates_restaurant(&restaurant_id) {
                Ok(vec![restaurant_id])
            } else {
                Err(FilterDenial::ConflictingField {
                    field: "restaurant_id",
                })
            }
        }
        None => Ok(actor.restaurant_ids().to_vec()),
    }
}
