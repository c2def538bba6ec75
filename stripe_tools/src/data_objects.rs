use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use storefront_common::USD_CURRENCY_CODE_LOWER;

/// One line of a hosted checkout page. Amounts are in the smallest currency unit (cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLineItem {
    pub name: String,
    pub unit_amount: i64,
    pub quantity: i64,
}

/// Parameters for `POST /v1/checkout/sessions` in `payment` mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCheckoutSession {
    pub currency: String,
    pub line_items: Vec<SessionLineItem>,
    pub metadata: BTreeMap<String, String>,
    pub client_reference_id: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

impl NewCheckoutSession {
    pub fn new<S: Into<String>>(success_url: S, cancel_url: S) -> Self {
        Self {
            currency: USD_CURRENCY_CODE_LOWER.to_string(),
            line_items: Vec::new(),
            metadata: BTreeMap::new(),
            client_reference_id: None,
            success_url: success_url.into(),
            cancel_url: cancel_url.into(),
        }
    }

    pub fn with_line_item(mut self, item: SessionLineItem) -> Self {
        self.line_items.push(item);
        self
    }

    pub fn with_metadata<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_client_reference_id<S: Into<String>>(mut self, id: S) -> Self {
        self.client_reference_id = Some(id.into());
        self
    }

    /// Stripe takes form-encoded bodies with bracketed keys for nested values.
    pub fn to_form_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
        ];
        if let Some(id) = &self.client_reference_id {
            params.push(("client_reference_id".to_string(), id.clone()));
        }
        for (i, item) in self.line_items.iter().enumerate() {
            let prefix = format!("line_items[{i}]");
            params.push((format!("{prefix}[price_data][currency]"), self.currency.clone()));
            params.push((format!("{prefix}[price_data][product_data][name]"), item.name.clone()));
            params.push((format!("{prefix}[price_data][unit_amount]"), item.unit_amount.to_string()));
            params.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
        }
        for (key, value) in &self.metadata {
            params.push((format!("metadata[{key}]"), value.clone()));
        }
        params
    }
}

/// The subset of Stripe's Checkout Session object that we use. It appears both in the create response and as the
/// payload of `checkout.session.*` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// The hosted payment page. Only present while the session is open.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }
}
