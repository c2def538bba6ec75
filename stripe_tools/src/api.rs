use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
    Method,
};
use serde::de::DeserializeOwned;

use crate::{config::StripeConfig, CheckoutSession, NewCheckoutSession, StripeApiError};

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.secret_key.reveal()))
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        if let Some(version) = &config.api_version {
            let val = HeaderValue::from_str(version).map_err(|e| StripeApiError::Initialization(e.to_string()))?;
            headers.insert("Stripe-Version", val);
        }
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Sends a form-encoded request. `idempotency_key` makes retries of the same logical request safe on Stripe's side.
    pub async fn form_query<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
        idempotency_key: Option<&str>,
    ) -> Result<T, StripeApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url).form(params);
        if let Some(key) = idempotency_key {
            req = req.header("Idempotency-Key", key);
        }
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                StripeApiError::Timeout(e.to_string())
            } else {
                StripeApiError::RestRequestError(e.to_string())
            }
        })?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
            Err(StripeApiError::QueryError { status, message })
        }
    }

    /// Creates a hosted checkout session and returns it. The session is guaranteed to carry a redirect URL.
    pub async fn create_checkout_session(
        &self,
        session: &NewCheckoutSession,
        idempotency_key: Option<&str>,
    ) -> Result<CheckoutSession, StripeApiError> {
        debug!("Creating checkout session with {} line items", session.line_items.len());
        let params = session.to_form_params();
        let result: CheckoutSession =
            self.form_query(Method::POST, "/v1/checkout/sessions", &params, idempotency_key).await?;
        if result.url.as_deref().map(str::is_empty).unwrap_or(true) {
            return Err(StripeApiError::MissingSessionUrl(result.id));
        }
        info!("Created checkout session {}", result.id);
        Ok(result)
    }
}
