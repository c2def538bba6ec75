use chrono::{DateTime, Utc};
use mockall::mock;
use storefront_engine::{
    db_types::{NewOrder, Order, OrderId, Product, ProductId, Store, StoreId},
    order_objects::Pagination,
    traits::{
        CatalogError,
        CatalogReader,
        GatewayError,
        HostedSession,
        HostedSessionRequest,
        OrderManagement,
        OrderStoreError,
        PaymentGateway,
    },
};

mock! {
    pub Storefront {}
    impl CatalogReader for Storefront {
        async fn fetch_store(&self, store_id: &StoreId) -> Result<Option<Store>, CatalogError>;
        async fn fetch_purchasable_product(&self, product_id: &ProductId) -> Result<Option<Product>, CatalogError>;
    }
    impl OrderManagement for Storefront {
        async fn insert_order_with_items(&self, order: NewOrder) -> Result<Order, OrderStoreError>;
        async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError>;
        async fn mark_paid_if_pending(&self, order_id: &OrderId) -> Result<bool, OrderStoreError>;
        async fn fetch_paid_orders_for_store(&self, store_id: &StoreId, since: DateTime<Utc>) -> Result<Vec<Order>, OrderStoreError>;
        async fn fetch_orders_for_store(&self, store_id: &StoreId, pagination: &Pagination) -> Result<Vec<Order>, OrderStoreError>;
    }
}

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn create_hosted_session(&self, request: HostedSessionRequest) -> Result<HostedSession, GatewayError>;
    }
}
