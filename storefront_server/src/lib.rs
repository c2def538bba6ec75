//! # Storefront server
//! This crate hosts the HTTP server for the storefront backend. It is responsible for:
//! * Accepting checkout requests, handing them to the checkout engine and returning the hosted payment page URL.
//! * Receiving payment notifications from Stripe, verifying their signatures and confirming the orders they refer to.
//! * Serving order listings and revenue reports to store owners.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `POST /stores/{store_id}/checkout`: Create a pending order and a Stripe checkout session for it.
//! * `GET /stores/{store_id}/orders`: A page of the store's orders, newest first.
//! * `GET /orders/{order_id}`: A single order with its items.
//! * `POST /webhooks`: Stripe webhook endpoint. Requests must carry a valid `Stripe-Signature` header.
//! * `GET /admin/stores/{store_id}/orders`: Paid orders and revenue for the store over the configured window.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
