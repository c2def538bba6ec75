use std::fmt::Display;

use serde::{Deserialize, Serialize};
use storefront_engine::{db_types::OrderId, order_objects::CheckoutResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

/// Response body for a successful checkout. The client redirects the buyer to `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    pub url: String,
}

impl From<CheckoutResult> for CheckoutResponse {
    fn from(result: CheckoutResult) -> Self {
        Self { order_id: result.order.id, url: result.session.redirect_url }
    }
}
