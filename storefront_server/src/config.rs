use std::{env, time::Duration};

use log::*;
use storefront_common::{helpers::parse_seconds, Secret};
use storefront_engine::{DEFAULT_GATEWAY_TIMEOUT, DEFAULT_REVENUE_WINDOW_DAYS};
use stripe_tools::{webhook::DEFAULT_TOLERANCE_SECS, StripeConfig};

use crate::errors::ServerError;

const DEFAULT_SF_HOST: &str = "127.0.0.1";
const DEFAULT_SF_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/storefront.db";
const DEFAULT_FRONT_URL: &str = "http://localhost:3000";
const DEFAULT_MAX_DB_CONNECTIONS: u32 = 25;
/// Webhook bodies larger than this are refused before the signature is checked.
pub const MAX_WEBHOOK_BODY_SIZE: usize = 64 * 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_db_connections: u32,
    /// Base URL of the storefront web app. Success and cancel redirects are built from it.
    pub front_url: String,
    /// Upper bound on the checkout session call, independent of the HTTP client timeout.
    pub gateway_timeout: Duration,
    pub revenue_window_days: i64,
    pub stripe: StripeConfig,
    pub webhook: WebhookConfig,
}

#[derive(Clone, Debug)]
pub struct WebhookConfig {
    pub signing_secret: Secret<String>,
    /// Maximum distance, in seconds, between a signature's timestamp and the server clock.
    pub tolerance_secs: i64,
    pub max_body_size: usize,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            signing_secret: Secret::default(),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
            max_body_size: MAX_WEBHOOK_BODY_SIZE,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SF_HOST.to_string(),
            port: DEFAULT_SF_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_db_connections: DEFAULT_MAX_DB_CONNECTIONS,
            front_url: DEFAULT_FRONT_URL.to_string(),
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
            revenue_window_days: DEFAULT_REVENUE_WINDOW_DAYS,
            stripe: StripeConfig::default(),
            webhook: WebhookConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SF_HOST").ok().unwrap_or_else(|| DEFAULT_SF_HOST.into());
        let port = env::var("SF_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!("🪛️ {s} is not a valid port for SF_PORT. {e} Using the default, {DEFAULT_SF_PORT}, instead.");
                    DEFAULT_SF_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SF_PORT);
        let database_url = env::var("SF_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SF_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_db_connections = env::var("SF_MAX_DB_CONNECTIONS")
            .ok()
            .and_then(|s| {
                s.parse::<u32>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for SF_MAX_DB_CONNECTIONS. {e}"))
                    .ok()
            })
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_DB_CONNECTIONS);
        let front_url = env::var("SF_FRONT_URL").ok().filter(|s| !s.trim().is_empty()).unwrap_or_else(|| {
            info!("🪛️ SF_FRONT_URL is not set. Checkout redirects will point at {DEFAULT_FRONT_URL}.");
            DEFAULT_FRONT_URL.to_string()
        });
        let gateway_timeout = Duration::from_secs(parse_seconds(
            env::var("SF_GATEWAY_TIMEOUT_SECS").ok(),
            DEFAULT_GATEWAY_TIMEOUT.as_secs(),
        ));
        let revenue_window_days = env::var("SF_REVENUE_WINDOW_DAYS")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for SF_REVENUE_WINDOW_DAYS. {e}"))
                    .ok()
            })
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_REVENUE_WINDOW_DAYS);
        let stripe = StripeConfig::new_from_env_or_default();
        let webhook = WebhookConfig::from_env_or_default();
        Self {
            host,
            port,
            database_url,
            max_db_connections,
            front_url,
            gateway_timeout,
            revenue_window_days,
            stripe,
            webhook,
        }
    }

    /// Checks for settings the server cannot run without.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.webhook.signing_secret.is_empty() {
            return Err(ServerError::ConfigurationError(
                "SF_STRIPE_WEBHOOK_SECRET is not set. Payment notifications cannot be verified without it.".into(),
            ));
        }
        if self.stripe.secret_key.is_empty() {
            warn!("🚨️ SF_STRIPE_SECRET_KEY is not set. Every checkout will fail at the payment gateway.");
        }
        Ok(())
    }
}

impl WebhookConfig {
    pub fn new(signing_secret: Secret<String>) -> Self {
        Self { signing_secret, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let signing_secret = env::var("SF_STRIPE_WEBHOOK_SECRET").ok().unwrap_or_else(|| {
            error!("🪛️ SF_STRIPE_WEBHOOK_SECRET is not set. Please set it to the signing secret of your Stripe endpoint.");
            String::default()
        });
        let tolerance_secs =
            parse_seconds(env::var("SF_WEBHOOK_TOLERANCE_SECS").ok(), DEFAULT_TOLERANCE_SECS as u64) as i64;
        Self { signing_secret: Secret::new(signing_secret), tolerance_secs, max_body_size: MAX_WEBHOOK_BODY_SIZE }
    }
}
