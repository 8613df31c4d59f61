//! Order Repository Trait
//!
//! Defines the persistence abstraction for orders.
//! Implemented by adapters in the infrastructure layer.

use async_trait::async_trait;

use super::aggregate::Order;
use super::errors::OrderError;
use super::query::OrderQuery;
use crate::domain::shared::OrderId;

/// Repository trait for Order persistence.
///
/// All mutations use compare-and-swap semantics on the aggregate's version
/// counter so concurrent writers cannot silently overwrite each other.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert a new order.
    ///
    /// # Errors
    ///
    /// Returns error if persistence fails or the id already exists.
    async fn insert(&self, order: &Order) -> Result<Order, OrderError>;

    /// Find an order by its ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderError>;

    /// Find all orders satisfying an effective query.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn query(&self, query: &OrderQuery) -> Result<Vec<Order>, OrderError>;

    /// Conditionally update an order.
    ///
    /// The write only applies if the stored version equals
    /// `expected_version`; on success the stored version is incremented and
    /// the updated order returned.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::VersionConflict`] when a concurrent write won
    /// the race, [`OrderError::NotFound`] when the order does not exist.
    async fn update(&self, order: &Order, expected_version: u64) -> Result<Order, OrderError>;
}
