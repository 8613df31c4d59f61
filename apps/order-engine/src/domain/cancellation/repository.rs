//! Cancellation Repository Trait

use async_trait::async_trait;

use super::aggregate::OrderCancellation;
use super::errors::CancellationError;
use super::query::CancellationQuery;
use crate::domain::shared::{CancellationId, OrderId};

/// Repository trait for OrderCancellation persistence.
#[async_trait]
pub trait CancellationRepository: Send + Sync {
    /// Insert a new cancellation.
    ///
    /// # Errors
    ///
    /// Returns error if persistence fails.
    async fn insert(
        &self,
        cancellation: &OrderCancellation,
    ) -> Result<OrderCancellation, CancellationError>;

    /// Find a cancellation by its ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_id(
        &self,
        id: &CancellationId,
    ) -> Result<Option<OrderCancellation>, CancellationError>;

    /// Find the cancellation recorded for an order.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<OrderCancellation>, CancellationError>;

    /// Find all cancellations satisfying an effective query.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn query(
        &self,
        query: &CancellationQuery,
    ) -> Result<Vec<OrderCancellation>, CancellationError>;

    /// Conditionally update a cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`CancellationError::VersionConflict`] when a concurrent
    /// write won the race, [`CancellationError::NotFound`] when the
    /// cancellation does not exist.
    async fn update(
        &self,
        cancellation: &OrderCancellation,
        expected_version: u64,
    ) -> Result<OrderCancellation, CancellationError>;
}
