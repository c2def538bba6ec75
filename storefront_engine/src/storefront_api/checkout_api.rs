use std::{fmt::Debug, time::Duration};

use log::*;

use crate::{
    db_types::{LineItem, NewOrder, Order, Store, StoreId},
    events::{EventProducers, OrderCreatedEvent},
    order_objects::{CheckoutRequest, CheckoutResult},
    storefront_api::errors::CheckoutError,
    traits::{HostedSessionRequest, PaymentGateway, StorefrontDatabase},
};

pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

/// `CheckoutApi` turns a basket of product ids into a pending order and a hosted payment page.
///
/// The order is committed locally *before* the gateway is called, so the order id carried in the session metadata
/// always refers to an order that exists. The price of this ordering is that a gateway failure leaves a pending order
/// behind with no session. Such orders are logged and never paid.
pub struct CheckoutApi<B, G> {
    db: B,
    gateway: G,
    producers: EventProducers,
    front_url: String,
    gateway_timeout: Duration,
}

impl<B, G> Debug for CheckoutApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi ({})", self.front_url)
    }
}

impl<B, G> CheckoutApi<B, G> {
    /// `front_url` is the base URL of the storefront web app. Buyers are sent back to
    /// `{front_url}/{store_id}/cart?success=true` or `...?canceled=true` when they leave the payment page.
    pub fn new<S: Into<String>>(db: B, gateway: G, front_url: S, producers: EventProducers) -> Self {
        let front_url = front_url.into().trim_end_matches('/').to_string();
        Self { db, gateway, producers, front_url, gateway_timeout: DEFAULT_GATEWAY_TIMEOUT }
    }

    pub fn with_gateway_timeout(mut self, timeout: Duration) -> Self {
        self.gateway_timeout = timeout;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn success_url(&self, store_id: &StoreId) -> String {
        format!("{}/{store_id}/cart?success=true", self.front_url)
    }

    pub fn cancel_url(&self, store_id: &StoreId) -> String {
        format!("{}/{store_id}/cart?canceled=true", self.front_url)
    }
}

impl<B, G> CheckoutApi<B, G>
where
    B: StorefrontDatabase,
    G: PaymentGateway,
{
    /// Validates the request against the catalog, stores a pending order with its items, and opens a hosted payment
    /// session for it.
    ///
    /// Validation is all-or-nothing. If the store or any product fails a check, nothing is written and the gateway is
    /// not called.
    pub async fn checkout(&self, store_id: &StoreId, request: CheckoutRequest) -> Result<CheckoutResult, CheckoutError> {
        validate_request(&request)?;
        let store = self.db.fetch_store(store_id).await?.ok_or_else(|| CheckoutError::StoreNotFound(store_id.clone()))?;
        let line_items = self.price_line_items(&store, &request).await?;
        let new_order = NewOrder::new(store.id.clone(), request.user_id, line_items);
        let order = self.db.insert_order_with_items(new_order).await?;
        info!(
            "🛒️ Order [{}] created for store {} with {} items totalling {}",
            order.id,
            order.store_id,
            order.items.len(),
            order.total_price()
        );
        self.call_order_created_hook(&order);

        let session_request = HostedSessionRequest {
            order_id: order.id.clone(),
            line_items: order.items.iter().map(LineItem::from).collect(),
            success_url: self.success_url(&store.id),
            cancel_url: self.cancel_url(&store.id),
        };
        let session =
            match tokio::time::timeout(self.gateway_timeout, self.gateway.create_hosted_session(session_request)).await {
                Ok(Ok(session)) => session,
                Ok(Err(reason)) => {
                    warn!("🛒️ Order [{}] is orphaned. The payment gateway failed: {reason}", order.id);
                    return Err(CheckoutError::GatewayError { order_id: order.id, reason });
                },
                Err(_) => {
                    warn!(
                        "🛒️ Order [{}] is orphaned. The payment gateway did not respond within {:?}",
                        order.id, self.gateway_timeout
                    );
                    return Err(CheckoutError::GatewayTimeout(order.id));
                },
            };
        debug!("🛒️ Order [{}] has checkout session {}", order.id, session.session_id);
        Ok(CheckoutResult { order, session })
    }

    /// Resolves the current catalog price and name for every distinct product in the request.
    async fn price_line_items(&self, store: &Store, request: &CheckoutRequest) -> Result<Vec<LineItem>, CheckoutError> {
        let mut line_items = Vec::new();
        for (product_id, quantity) in request.quantities() {
            let product = self
                .db
                .fetch_purchasable_product(&product_id)
                .await?
                .ok_or_else(|| CheckoutError::ProductNotFound(product_id.clone()))?;
            if product.store_id != store.id {
                debug!("🛒️ Product {product_id} belongs to store {}, not {}", product.store_id, store.id);
                return Err(CheckoutError::ProductNotInStore { product_id, store_id: store.id.clone() });
            }
            let unit_price = product.price.ok_or_else(|| CheckoutError::ProductNotPurchasable(product_id.clone()))?;
            trace!("🛒️ {quantity} x {} at {unit_price}", product.name);
            line_items.push(LineItem::new(product.id, product.name, unit_price, quantity));
        }
        Ok(line_items)
    }

    fn call_order_created_hook(&self, order: &Order) {
        for emitter in &self.producers.order_created_producer {
            debug!("🛒️ Notifying order created hook subscribers");
            emitter.publish_event(OrderCreatedEvent::new(order.clone()));
        }
    }
}

fn validate_request(request: &CheckoutRequest) -> Result<(), CheckoutError> {
    if request.user_id.trim().is_empty() {
        return Err(CheckoutError::InvalidRequest("A user id is required".into()));
    }
    if request.product_ids.is_empty() {
        return Err(CheckoutError::InvalidRequest("At least one product id is required".into()));
    }
    Ok(())
}
