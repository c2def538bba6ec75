//! `SqliteDatabase` is a concrete implementation of a storefront engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`] module.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqlitePool;

use super::db::{catalog, db_url, new_pool, orders};
use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType, Product, ProductId, Store, StoreId},
    order_objects::{OrderQueryFilter, Pagination},
    traits::{CatalogError, CatalogReader, OrderManagement, OrderStoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl CatalogReader for SqliteDatabase {
    async fn fetch_store(&self, store_id: &StoreId) -> Result<Option<Store>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let store = catalog::fetch_store(store_id, &mut conn).await?;
        Ok(store)
    }

    async fn fetch_purchasable_product(&self, product_id: &ProductId) -> Result<Option<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let product = catalog::fetch_published_product(product_id, &mut conn).await?;
        Ok(product)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order_with_items(&self, order: NewOrder) -> Result<Order, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let order_id = order.id.clone();
        let order = orders::insert_order_with_items(order, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order [{order_id}] and its {} items have been saved in the DB", order.items.len());
        Ok(order)
    }

    async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn mark_paid_if_pending(&self, order_id: &OrderId) -> Result<bool, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let transitioned = orders::mark_paid_if_pending(order_id, &mut conn).await?;
        if transitioned {
            debug!("🗃️ Order [{order_id}] marked as paid");
        }
        Ok(transitioned)
    }

    async fn fetch_paid_orders_for_store(
        &self,
        store_id: &StoreId,
        since: DateTime<Utc>,
    ) -> Result<Vec<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let query = OrderQueryFilter::default()
            .with_store_id(store_id.clone())
            .with_status(OrderStatusType::Paid)
            .since(since);
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_orders_for_store(
        &self,
        store_id: &StoreId,
        pagination: &Pagination,
    ) -> Result<Vec<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let query = OrderQueryFilter::default().with_store_id(store_id.clone()).with_pagination(*pagination);
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Applies any outstanding schema migrations. The migrations are embedded in the binary at compile time.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
