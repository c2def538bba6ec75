use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderId},
    events::{EventProducers, OrderPaidEvent},
    payment_objects::{NotificationOutcome, PaymentEvent},
    storefront_api::errors::NotificationError,
    traits::OrderManagement,
};

/// `PaymentNotificationApi` applies authenticated payment notifications to orders.
///
/// This is the only code path that moves an order to `Paid`. Gateways deliver notifications at least once, possibly
/// concurrently, so processing is idempotent: the store performs a conditional transition and only the caller that
/// wins it publishes [`OrderPaidEvent`].
pub struct PaymentNotificationApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for PaymentNotificationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentNotificationApi")
    }
}

impl<B> PaymentNotificationApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> PaymentNotificationApi<B>
where B: OrderManagement
{
    pub async fn process_payment_event(&self, event: PaymentEvent) -> Result<NotificationOutcome, NotificationError> {
        match event {
            PaymentEvent::CheckoutCompleted { event_id, order_id } => {
                debug!("💳️ Event {event_id}: checkout completed for order [{order_id}]");
                self.confirm_payment(&order_id).await
            },
            PaymentEvent::Ignored { event_id, event_type } => {
                debug!("💳️ Event {event_id} has type {event_type}. Nothing to do.");
                Ok(NotificationOutcome::Ignored(event_type))
            },
        }
    }

    /// Moves the order to `Paid` if it is pending. Repeated calls for the same order succeed without side effects.
    pub async fn confirm_payment(&self, order_id: &OrderId) -> Result<NotificationOutcome, NotificationError> {
        let transitioned = self.db.mark_paid_if_pending(order_id).await?;
        let order = self.db.fetch_order_by_id(order_id).await?;
        match (transitioned, order) {
            (true, Some(order)) => {
                info!("💳️ Order [{order_id}] is paid. {} received.", order.total_price());
                self.call_order_paid_hook(&order);
                Ok(NotificationOutcome::Paid(order))
            },
            (false, Some(order)) if order.is_paid() => {
                info!("💳️ Order [{order_id}] was already paid. Duplicate notification ignored.");
                Ok(NotificationOutcome::AlreadyPaid(order))
            },
            (false, Some(order)) => {
                // Only reachable if a status other than Pending or Paid is ever introduced.
                error!("💳️ Order [{order_id}] has status {} and cannot be marked as paid", order.status);
                Err(NotificationError::DatabaseError(format!("Order {order_id} is in status {}", order.status)))
            },
            (_, None) => {
                error!(
                    "💳️ Payment confirmed for order [{order_id}], but no such order exists. Either the gateway metadata \
                     was tampered with or the order was removed. This needs investigation."
                );
                Err(NotificationError::OrderNotFound(order_id.clone()))
            },
        }
    }

    fn call_order_paid_hook(&self, order: &Order) {
        for emitter in &self.producers.order_paid_producer {
            debug!("💳️ Notifying order paid hook subscribers");
            emitter.publish_event(OrderPaidEvent::new(order.clone()));
        }
    }
}
