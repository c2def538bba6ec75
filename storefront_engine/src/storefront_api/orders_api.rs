use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderId, StoreId},
    order_objects::Pagination,
    traits::{OrderManagement, OrderStoreError},
};

/// Order history lookups for store owners and buyers.
pub struct OrdersApi<B> {
    db: B,
}

impl<B> Debug for OrdersApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrdersApi")
    }
}

impl<B> OrdersApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrdersApi<B>
where B: OrderManagement
{
    pub async fn order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError> {
        self.db.fetch_order_by_id(order_id).await
    }

    /// A page of the store's orders, pending and paid alike, newest first.
    pub async fn orders_for_store(
        &self,
        store_id: &StoreId,
        pagination: &Pagination,
    ) -> Result<Vec<Order>, OrderStoreError> {
        let orders = self.db.fetch_orders_for_store(store_id, pagination).await?;
        trace!("📦️ Fetched {} orders for store {store_id}", orders.len());
        Ok(orders)
    }
}
