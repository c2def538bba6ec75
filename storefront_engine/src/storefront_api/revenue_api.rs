use std::fmt::Debug;

use chrono::{Duration, Utc};
use log::*;

use crate::{
    db_types::StoreId,
    order_objects::RevenueReport,
    traits::{OrderManagement, OrderStoreError},
};

pub const DEFAULT_REVENUE_WINDOW_DAYS: i64 = 365;

/// Read-only revenue figures for store owners.
pub struct RevenueApi<B> {
    db: B,
    window: Duration,
}

impl<B> Debug for RevenueApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RevenueApi ({} day window)", self.window.num_days())
    }
}

impl<B> RevenueApi<B> {
    pub fn new(db: B) -> Self {
        Self { db, window: Duration::days(DEFAULT_REVENUE_WINDOW_DAYS) }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl<B> RevenueApi<B>
where B: OrderManagement
{
    /// Revenue realised by the store over the trailing window. Only paid orders count.
    pub async fn revenue_for_store(&self, store_id: &StoreId) -> Result<RevenueReport, OrderStoreError> {
        let since = Utc::now() - self.window;
        let orders = self.db.fetch_paid_orders_for_store(store_id, since).await?;
        let report = RevenueReport::from_paid_orders(orders);
        debug!(
            "📊️ Store {store_id} has {} sales totalling {} since {since}",
            report.sales_count, report.total_revenue
        );
        Ok(report)
    }
}
