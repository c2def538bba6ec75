//! # Backend and collaborator contracts
//!
//! This module defines the behaviour that the storefront engine expects from the things it does not own: the
//! datastore backend and the external payment gateway.
//!
//! * [`CatalogReader`] resolves stores and products. The engine only ever reads the catalog.
//! * [`OrderManagement`] is the durable record of orders and their items. It offers an atomic multi-row insert and a
//!   single-row conditional status transition, and nothing else mutates an order.
//! * [`PaymentGateway`] creates hosted payment sessions. It is injected into the checkout API, so tests can substitute
//!   a fake and production code can plug in a real provider.
//! * [`StorefrontDatabase`] is the union of the two backend traits, for APIs that need both.
mod catalog_reader;
mod order_management;
mod payment_gateway;

pub use catalog_reader::{CatalogError, CatalogReader};
pub use order_management::{OrderManagement, OrderStoreError};
pub use payment_gateway::{GatewayError, HostedSession, HostedSessionRequest, PaymentGateway};

/// A backend that can serve both the catalog and the order store.
pub trait StorefrontDatabase: CatalogReader + OrderManagement {}

impl<T> StorefrontDatabase for T where T: CatalogReader + OrderManagement {}
