//! Entity-change notifications.
//!
//! Services publish an [`EntityChanged`] after the store has committed a write. Any
//! number of subscribers may listen; a slow subscriber lags and loses the oldest
//! events rather than holding up the publisher.

use crate::model::Product;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Removed,
}

/// One committed change, carrying the record as stored afterwards (or, for
/// `Removed`, as it was when removed).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityChanged {
    pub kind: ChangeKind,
    pub product: Product,
}

/// Broadcast channel for [`EntityChanged`] events.
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<EntityChanged>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EntityChanged> {
        self.sender.subscribe()
    }

    /// Publishes `product` under `kind` and returns how many subscribers received it.
    pub fn publish(&self, kind: ChangeKind, product: Product) -> usize {
        let id = product.id;
        // No subscribers is a normal state, not a failure.
        let delivered = self
            .sender
            .send(EntityChanged { kind, product })
            .unwrap_or(0);
        debug!(%id, ?kind, delivered, "Entity changed");
        delivered
    }
}
