use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderId, StoreId},
    order_objects::Pagination,
};

#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Cannot insert order {0}, since it has no items")]
    EmptyOrder(OrderId),
    #[error("Cannot insert order, since it already exists with id {0}")]
    OrderAlreadyExists(OrderId),
}

impl From<sqlx::Error> for OrderStoreError {
    fn from(e: sqlx::Error) -> Self {
        OrderStoreError::DatabaseError(e.to_string())
    }
}

/// The durable record of orders and their line items.
///
/// Backends must guarantee two things:
/// * [`insert_order_with_items`](OrderManagement::insert_order_with_items) is all-or-nothing. Either the order and
///   every one of its items are visible, or none of them are.
/// * [`mark_paid_if_pending`](OrderManagement::mark_paid_if_pending) is a single conditional write. When several
///   callers race on the same order, exactly one of them observes `true`.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores the order and all of its items in a single atomic transaction. The order is created with status
    /// `Pending`. Returns the stored order, items included.
    async fn insert_order_with_items(&self, order: NewOrder) -> Result<Order, OrderStoreError>;

    /// Fetches the order with the given id, along with its items.
    async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError>;

    /// Moves the order from `Pending` to `Paid`. Returns `true` if this call performed the transition, and `false`
    /// if the order does not exist or was not pending.
    async fn mark_paid_if_pending(&self, order_id: &OrderId) -> Result<bool, OrderStoreError>;

    /// Fetches every paid order of the store that was created at or after `since`, with items.
    async fn fetch_paid_orders_for_store(
        &self,
        store_id: &StoreId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Order>, OrderStoreError>;

    /// Fetches a page of the store's orders (any status), newest first, with items.
    async fn fetch_orders_for_store(
        &self,
        store_id: &StoreId,
        pagination: &Pagination,
    ) -> Result<Vec<Order>, OrderStoreError>;
}
