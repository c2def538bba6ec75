//! # Storefront engine public API
//!
//! The `storefront_api` module exposes the programmatic API of the engine. It is modular, so that clients can pick the
//! functionality they need.
//!
//! * [`checkout_api`] validates a basket against the catalog, stores a pending order and opens a hosted payment
//!   session for it.
//! * [`notification_api`] applies authenticated payment notifications, moving orders from pending to paid.
//! * [`revenue_api`] reports realised revenue for a store.
//! * [`orders_api`] lists and fetches orders.
//!
//! # API usage
//!
//! Every API is created by handing it a backend that implements the traits it needs:
//!
//! ```rust,ignore
//! use storefront_engine::{RevenueApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements OrderManagement
//! let api = RevenueApi::new(db);
//! let report = api.revenue_for_store(&store_id).await?;
//! ```
pub mod checkout_api;
pub mod errors;
pub mod notification_api;
pub mod order_objects;
pub mod orders_api;
pub mod payment_objects;
pub mod revenue_api;
