//! Simple stateless pub-sub event handler
//!
//! Components of the storefront can subscribe to engine events (an order was created, an order was paid) and react to
//! them. Handlers are stateless: they receive the event and nothing else. Handlers can be async.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{
    sync::{mpsc, mpsc::error::TrySendError},
    task::JoinSet,
};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Runs until every producer has been dropped, then waits for in-flight handlers to finish.
    pub async fn start_handler(mut self) {
        debug!("📬️ Starting event handler");
        // Without this, the channel would never close, since we'd always hold a sender ourselves.
        drop(self.sender);
        let mut jobs = JoinSet::new();
        while let Some(ev) = self.listener.recv().await {
            trace!("📬️ Handling event");
            let handler = Arc::clone(&self.handler);
            jobs.spawn(async move {
                (handler)(ev).await;
                trace!("📬️ Event handled");
            });
            // Reap finished jobs so the set doesn't grow without bound on long-running servers
            while jobs.try_join_next().is_some() {}
        }
        debug!("📬️ All producers are gone. Waiting for {} jobs to complete", jobs.len());
        while let Some(result) = jobs.join_next().await {
            if let Err(e) = result {
                warn!("📬️ An event handler task failed: {e}");
            }
        }
        debug!("📬️ Event handler has shut down");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    /// Queues `event` for the handler without waiting. If the buffer is full or the handler has gone away, the event
    /// is dropped and `false` is returned.
    pub fn publish_event(&self, event: E) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("📬️ Event buffer is full. The event has been dropped");
                false
            },
            Err(TrySendError::Closed(_)) => {
                error!("📬️ Failed to send event: the event handler has shut down");
                false
            },
        }
    }
}
