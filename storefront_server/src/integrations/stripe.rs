//! Glue between the provider-agnostic engine and Stripe.
//!
//! Outbound, [`StripeGateway`] implements the engine's [`PaymentGateway`] with Stripe hosted checkout. Inbound,
//! [`payment_event_from_stripe`] turns a verified Stripe event into the engine's [`PaymentEvent`].
use futures::future::BoxFuture;
use log::*;
use storefront_engine::{
    db_types::OrderId,
    events::{EventHandlers, EventHooks},
    payment_objects::PaymentEvent,
    GatewayError,
    HostedSession,
    HostedSessionRequest,
    PaymentGateway,
};
use stripe_tools::{
    NewCheckoutSession,
    SessionLineItem,
    StripeApi,
    StripeApiError,
    StripeConfig,
    StripeEvent,
    StripeEventKind,
};

use crate::errors::ServerError;

/// The session metadata key that carries our order id. Stripe echoes it back in `checkout.session.completed`.
pub const ORDER_ID_METADATA_KEY: &str = "order_id";
pub const STOREFRONT_EVENT_BUFFER_SIZE: usize = 25;

#[derive(Clone)]
pub struct StripeGateway {
    api: StripeApi,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let api = StripeApi::new(config)?;
        Ok(Self { api })
    }
}

impl PaymentGateway for StripeGateway {
    async fn create_hosted_session(&self, request: HostedSessionRequest) -> Result<HostedSession, GatewayError> {
        let order_id = request.order_id.clone();
        let session = new_checkout_session(request);
        // One session per order. Should the call be retried, Stripe returns the original session.
        let idempotency_key = format!("checkout-{order_id}");
        let session = self.api.create_checkout_session(&session, Some(&idempotency_key)).await.map_err(|e| {
            warn!("💳️ Could not create a Stripe checkout session for order [{order_id}]. {e}");
            gateway_error(e)
        })?;
        let redirect_url = session.url.ok_or_else(|| StripeApiError::MissingSessionUrl(session.id.clone()));
        let redirect_url = redirect_url.map_err(gateway_error)?;
        Ok(HostedSession { session_id: session.id, redirect_url })
    }
}

/// Builds the Stripe session parameters for an order. Prices are sent as inline `price_data` in cents, and the order
/// id is attached as both metadata and client reference.
pub fn new_checkout_session(request: HostedSessionRequest) -> NewCheckoutSession {
    let HostedSessionRequest { order_id, line_items, success_url, cancel_url } = request;
    line_items
        .into_iter()
        .map(|item| SessionLineItem { name: item.name, unit_amount: item.unit_price.value(), quantity: item.quantity })
        .fold(NewCheckoutSession::new(success_url, cancel_url), NewCheckoutSession::with_line_item)
        .with_metadata(ORDER_ID_METADATA_KEY, order_id.as_str())
        .with_client_reference_id(order_id.as_str())
}

fn gateway_error(e: StripeApiError) -> GatewayError {
    match e {
        StripeApiError::QueryError { status, message } => GatewayError::Rejected { status, message },
        StripeApiError::JsonError(s) => GatewayError::InvalidResponse(s),
        StripeApiError::MissingSessionUrl(id) => GatewayError::InvalidResponse(format!("Session {id} has no URL")),
        e => GatewayError::Unavailable(e.to_string()),
    }
}

/// Converts a verified Stripe event into an engine event.
///
/// A completed checkout without an order id in its metadata is a permanent failure: redelivering it will not help,
/// and it cannot be matched to any order.
pub fn payment_event_from_stripe(event: StripeEvent) -> Result<PaymentEvent, ServerError> {
    let StripeEvent { id, kind } = event;
    match kind {
        StripeEventKind::CheckoutSessionCompleted(session) => {
            let order_id = session.metadata_value(ORDER_ID_METADATA_KEY).map(OrderId::from).ok_or_else(|| {
                warn!("💳️ Checkout session {} in event {id} has no order id in its metadata", session.id);
                ServerError::InvalidRequestBody(format!("Checkout session {} has no order_id metadata", session.id))
            })?;
            Ok(PaymentEvent::CheckoutCompleted { event_id: id, order_id })
        },
        StripeEventKind::Other(event_type) => Ok(PaymentEvent::Ignored { event_id: id, event_type }),
    }
}

/// Hooks that record order lifecycle events in the log.
pub fn create_logging_event_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks.on_order_created(|ev| {
        let order = ev.order;
        info!("📬️ Order [{}] created in store {} for {}", order.id, order.store_id, order.total_price());
        no_op()
    });
    hooks.on_order_paid(|ev| {
        let order = ev.order;
        info!("📬️ Order [{}] in store {} paid. {} received", order.id, order.store_id, order.total_price());
        no_op()
    });
    EventHandlers::new(STOREFRONT_EVENT_BUFFER_SIZE, hooks)
}

fn no_op() -> BoxFuture<'static, ()> {
    Box::pin(async {})
}
