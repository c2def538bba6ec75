use std::time::Duration;

use log::*;
use storefront_common::{helpers::parse_seconds, Secret};

pub const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com";
pub const DEFAULT_STRIPE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default)]
pub struct StripeConfig {
    /// Base URL of the Stripe API. Overridable so that tests and stripe-mock can be used.
    pub api_url: String,
    pub secret_key: Secret<String>,
    /// Pins the API version sent in the `Stripe-Version` header. The account default is used when absent.
    pub api_version: Option<String>,
    pub timeout: Duration,
}

impl StripeConfig {
    pub fn new<S: Into<String>>(api_url: S, secret_key: Secret<String>) -> Self {
        Self {
            api_url: api_url.into(),
            secret_key,
            api_version: None,
            timeout: Duration::from_secs(DEFAULT_STRIPE_TIMEOUT_SECS),
        }
    }

    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("SF_STRIPE_API_URL").unwrap_or_else(|_| {
            info!("🪛️ SF_STRIPE_API_URL not set, using {DEFAULT_STRIPE_API_URL}");
            DEFAULT_STRIPE_API_URL.to_string()
        });
        let secret_key = Secret::new(std::env::var("SF_STRIPE_SECRET_KEY").unwrap_or_else(|_| {
            warn!("🪛️ SF_STRIPE_SECRET_KEY not set. Checkout sessions cannot be created until it is.");
            String::default()
        }));
        let api_version = std::env::var("SF_STRIPE_API_VERSION").ok().filter(|s| !s.trim().is_empty());
        let timeout =
            Duration::from_secs(parse_seconds(std::env::var("SF_GATEWAY_TIMEOUT_SECS").ok(), DEFAULT_STRIPE_TIMEOUT_SECS));
        Self { api_url: api_url.trim_end_matches('/').to_string(), secret_key, api_version, timeout }
    }
}
