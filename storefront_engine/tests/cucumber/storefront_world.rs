use std::collections::HashMap;

use cucumber::World;
use log::*;
use storefront_engine::{
    db_types::OrderId,
    events::EventProducers,
    order_objects::CheckoutResult,
    payment_objects::NotificationOutcome,
    test_utils::{
        fake_gateway::FakeGateway,
        prepare_env::{prepare_test_env, random_db_path},
    },
    CheckoutApi,
    CheckoutError,
    NotificationError,
    PaymentNotificationApi,
    RevenueApi,
    SqliteDatabase,
};

#[derive(Default, Debug, World)]
pub struct StorefrontWorld {
    pub system: Option<StorefrontSystem>,
    /// Orders created during the scenario, by the alias the scenario gave them
    pub orders: HashMap<String, OrderId>,
    pub last_checkout: Option<Result<CheckoutResult, CheckoutError>>,
    pub last_notification: Option<Result<NotificationOutcome, NotificationError>>,
}

#[derive(Debug)]
pub struct StorefrontSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub gateway: FakeGateway,
}

impl StorefrontSystem {
    pub async fn new() -> Self {
        let db_path = random_db_path();
        let db = prepare_test_env(&db_path).await;
        debug!("Created database: {db_path}");
        Self { db_path, db, gateway: FakeGateway::default() }
    }
}

impl StorefrontWorld {
    pub fn system(&self) -> &StorefrontSystem {
        self.system.as_ref().expect("System not initialised. Did you forget 'Given a fresh install'?")
    }

    pub fn db(&self) -> &SqliteDatabase {
        &self.system().db
    }

    pub fn checkout_api(&self) -> CheckoutApi<SqliteDatabase, FakeGateway> {
        let system = self.system();
        CheckoutApi::new(system.db.clone(), system.gateway.clone(), "http://localhost:3000", EventProducers::default())
    }

    pub fn notification_api(&self) -> PaymentNotificationApi<SqliteDatabase> {
        PaymentNotificationApi::new(self.db().clone(), EventProducers::default())
    }

    pub fn revenue_api(&self) -> RevenueApi<SqliteDatabase> {
        RevenueApi::new(self.db().clone())
    }

    pub fn order_id(&self, alias: &str) -> OrderId {
        self.orders.get(alias).cloned().unwrap_or_else(|| panic!("No order with alias {alias}"))
    }
}
