use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::{LineItem, OrderId};

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("The payment gateway could not be reached. {0}")]
    Unavailable(String),
    #[error("The payment gateway rejected the request ({status}). {message}")]
    Rejected { status: u16, message: String },
    #[error("The payment gateway sent a response we could not understand. {0}")]
    InvalidResponse(String),
}

/// Everything the gateway needs to host a payment page for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedSessionRequest {
    /// Attached to the session as metadata, and echoed back in the completion notification.
    pub order_id: OrderId,
    pub line_items: Vec<LineItem>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedSession {
    pub session_id: String,
    /// Where the buyer is sent to pay.
    pub redirect_url: String,
}

/// An external payment provider that can host a checkout page.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    async fn create_hosted_session(&self, request: HostedSessionRequest) -> Result<HostedSession, GatewayError>;
}
