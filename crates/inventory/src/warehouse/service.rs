use crate::config::StockPolicy;
use crate::error::InventoryError;
use crate::events::{ChangeFeed, ChangeKind};
use crate::model::{Product, ProductId, ProductUpdate};
use entity_store::StoreClient;
use tracing::{debug, info, instrument, warn};

/// The stock component: sole writer of `Product::quantity`.
#[derive(Clone)]
pub struct StockService {
    store: StoreClient<Product>,
    policy: StockPolicy,
    changes: ChangeFeed,
}

impl StockService {
    pub fn new(store: StoreClient<Product>, policy: StockPolicy, changes: ChangeFeed) -> Self {
        Self {
            store,
            policy,
            changes,
        }
    }

    pub fn policy(&self) -> StockPolicy {
        self.policy
    }

    /// Returns the full record, including its quantity.
    #[instrument(skip(self))]
    pub async fn count(&self, id: ProductId) -> Result<Product, InventoryError> {
        debug!("Reading stock");
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| InventoryError::NotFound(id.to_string()))
    }

    /// Removes `value` units from stock in one atomic store update.
    ///
    /// `value` must be positive; anything else is refused before the store is contacted.
    /// Under [`StockPolicy::Strict`] the update carries a floor of zero and fails with
    /// `InsufficientStock` instead of going negative. On success exactly one
    /// `Updated` change is published, after the store has committed.
    #[instrument(skip(self))]
    pub async fn decrease(&self, id: ProductId, value: i64) -> Result<Product, InventoryError> {
        if value <= 0 {
            warn!(value, "Rejected non-positive decrement");
            return Err(InventoryError::InvalidArgument(format!(
                "value must be a positive integer, got {}",
                value
            )));
        }

        let update = ProductUpdate::AdjustQuantity {
            delta: -value,
            floor: self.policy.floor(),
        };
        let product = self.store.update_by_id(id, update).await?;
        info!(quantity = product.quantity, "Stock decreased");

        self.changes.publish(ChangeKind::Updated, product.clone());
        Ok(product)
    }
}
