use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Cents, Order, OrderStatusType, ProductId, StoreId},
    traits::HostedSession,
};

/// The body of a checkout request. Repeating a product id buys that product more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub user_id: String,
    pub product_ids: Vec<ProductId>,
}

impl CheckoutRequest {
    pub fn new<S: Into<String>>(user_id: S, product_ids: Vec<ProductId>) -> Self {
        Self { user_id: user_id.into(), product_ids }
    }

    /// Collapses repeated product ids into `(product_id, quantity)` pairs, keeping the order of first appearance.
    pub fn quantities(&self) -> Vec<(ProductId, i64)> {
        let mut result: Vec<(ProductId, i64)> = Vec::with_capacity(self.product_ids.len());
        for id in &self.product_ids {
            match result.iter_mut().find(|(p, _)| p == id) {
                Some((_, qty)) => *qty += 1,
                None => result.push((id.clone(), 1)),
            }
        }
        result
    }
}

/// The outcome of a successful checkout: the committed order and the gateway session the buyer should be sent to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResult {
    pub order: Order,
    pub session: HostedSession,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueReport {
    pub orders: Vec<Order>,
    pub total_revenue: Cents,
    pub sales_count: usize,
}

impl RevenueReport {
    /// Sums `unit_price × quantity` over every item of every order. The caller is responsible for passing only paid
    /// orders.
    pub fn from_paid_orders(orders: Vec<Order>) -> Self {
        let total_revenue = orders.iter().map(Order::total_price).sum();
        let sales_count = orders.len();
        Self { orders, total_revenue, sales_count }
    }
}

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset: Some(offset), limit: Some(limit) }
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub store_id: Option<StoreId>,
    pub since: Option<DateTime<Utc>>,
    pub status: Option<Vec<OrderStatusType>>,
    pub pagination: Option<Pagination>,
}

impl OrderQueryFilter {
    pub fn with_store_id(mut self, store_id: StoreId) -> Self {
        self.store_id = Some(store_id);
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// True if no `WHERE` criteria are set. Pagination does not count as a criterion.
    pub fn is_empty(&self) -> bool {
        self.store_id.is_none()
            && self.since.is_none()
            && self.status.as_ref().map(|s| s.is_empty()).unwrap_or(true)
    }
}
