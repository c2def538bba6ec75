//! Storefront Engine
//!
//! The storefront engine holds the checkout and payment-confirmation logic of the storefront backend. It coordinates
//! two systems that fail independently, the local datastore and an external payment gateway, and keeps one invariant
//! between them: an order is only ever marked as paid in response to an authenticated completion notification, and
//! exactly once. It is provider-agnostic.
//!
//! The library is divided into these sections:
//! 1. Backend contracts ([`mod@traits`]) and the SQLite implementation of them ([`SqliteDatabase`]). You should never
//!    need to access the database directly. The exception is the data types, which live in [`db_types`].
//! 2. The public API ([`mod@storefront_api`]): checkout, payment notifications, revenue and order lookups.
//! 3. Events ([`mod@events`]). When an order is created or paid, an event is emitted to any subscribed hooks.
pub mod db_types;
pub mod events;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;
mod storefront_api;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::{db as sqlite_db, SqliteDatabase};
pub use storefront_api::{
    checkout_api::{CheckoutApi, DEFAULT_GATEWAY_TIMEOUT},
    errors::{CheckoutError, NotificationError},
    notification_api::PaymentNotificationApi,
    order_objects,
    orders_api::OrdersApi,
    payment_objects,
    revenue_api::{RevenueApi, DEFAULT_REVENUE_WINDOW_DAYS},
};
pub use traits::{
    CatalogError,
    CatalogReader,
    GatewayError,
    HostedSession,
    HostedSessionRequest,
    OrderManagement,
    OrderStoreError,
    PaymentGateway,
    StorefrontDatabase,
};
