use thiserror::Error;

use crate::{
    db_types::{OrderId, ProductId, StoreId},
    traits::{CatalogError, GatewayError, OrderStoreError},
};

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Invalid checkout request. {0}")]
    InvalidRequest(String),
    #[error("Store {0} does not exist")]
    StoreNotFound(StoreId),
    #[error("Product {0} does not exist")]
    ProductNotFound(ProductId),
    #[error("Product {product_id} is not sold by store {store_id}")]
    ProductNotInStore { product_id: ProductId, store_id: StoreId },
    #[error("Product {0} does not have a price and cannot be bought")]
    ProductNotPurchasable(ProductId),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {order_id} was created, but the payment gateway failed. {reason}")]
    GatewayError { order_id: OrderId, reason: GatewayError },
    #[error("Order {0} was created, but the payment gateway did not respond in time")]
    GatewayTimeout(OrderId),
}

impl CheckoutError {
    /// True if the request itself was at fault and resubmitting it unchanged will fail again.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_)
                | Self::StoreNotFound(_)
                | Self::ProductNotFound(_)
                | Self::ProductNotInStore { .. }
                | Self::ProductNotPurchasable(_)
        )
    }
}

impl From<CatalogError> for CheckoutError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::DatabaseError(s) => Self::DatabaseError(s),
        }
    }
}

impl From<OrderStoreError> for CheckoutError {
    fn from(e: OrderStoreError) -> Self {
        match e {
            OrderStoreError::DatabaseError(s) => Self::DatabaseError(s),
            OrderStoreError::EmptyOrder(_) => Self::InvalidRequest(e.to_string()),
            OrderStoreError::OrderAlreadyExists(_) => Self::DatabaseError(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Payment notification refers to order {0}, which does not exist")]
    OrderNotFound(OrderId),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<OrderStoreError> for NotificationError {
    fn from(e: OrderStoreError) -> Self {
        Self::DatabaseError(e.to_string())
    }
}
