//! Stripe integration tools
//!
//! * [`StripeApi`] is a small REST client that creates hosted checkout sessions.
//! * [`webhook`] authenticates and decodes the notifications Stripe sends back.
mod api;
mod config;
mod data_objects;
mod error;
pub mod webhook;

pub use api::StripeApi;
pub use config::StripeConfig;
pub use data_objects::{CheckoutSession, NewCheckoutSession, SessionLineItem};
pub use error::StripeApiError;
pub use webhook::{StripeEvent, StripeEventKind};
