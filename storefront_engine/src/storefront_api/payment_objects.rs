use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderId};

/// A payment notification, after the gateway-specific envelope has been authenticated and decoded.
///
/// Gateways send many kinds of notification. Only checkout completion matters here; everything else is carried as
/// [`PaymentEvent::Ignored`] so that it can be acknowledged without touching any order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentEvent {
    CheckoutCompleted { event_id: String, order_id: OrderId },
    Ignored { event_id: String, event_type: String },
}

/// What processing a [`PaymentEvent`] did. All three are successes from the gateway's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationOutcome {
    /// This notification moved the order from pending to paid.
    Paid(Order),
    /// The order was already paid. Duplicate deliveries land here.
    AlreadyPaid(Order),
    /// The event type is not one we act on.
    Ignored(String),
}

impl NotificationOutcome {
    pub fn describe(&self) -> String {
        match self {
            NotificationOutcome::Paid(order) => format!("Order {} has been marked as paid", order.id),
            NotificationOutcome::AlreadyPaid(order) => format!("Order {} was already paid", order.id),
            NotificationOutcome::Ignored(kind) => format!("Event type {kind} ignored"),
        }
    }
}
