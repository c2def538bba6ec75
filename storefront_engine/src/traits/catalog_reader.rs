use thiserror::Error;

use crate::db_types::{Product, ProductId, Store, StoreId};

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}

/// Read-only access to stores and products.
#[allow(async_fn_in_trait)]
pub trait CatalogReader {
    /// Fetches the store with the given id, or `None` if it does not exist.
    async fn fetch_store(&self, store_id: &StoreId) -> Result<Option<Store>, CatalogError>;

    /// Fetches the product with the given id, if it exists *and* is published. Unpublished products are
    /// indistinguishable from missing ones to buyers.
    ///
    /// The product may still be unpurchasable if it has no price; callers must check [`Product::price`].
    async fn fetch_purchasable_product(&self, product_id: &ProductId) -> Result<Option<Product>, CatalogError>;
}
