use crate::catalog::{sample_catalog, seed_if_empty, CatalogService};
use crate::config::InventoryConfig;
use crate::error::InventoryError;
use crate::events::ChangeFeed;
use crate::model::Product;
use crate::router::StockRouter;
use crate::warehouse::StockService;
use entity_store::{EntityStore, StoreClient};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The running inventory: one entity store, the warehouse behind its router, and the
/// catalog wired to both.
///
/// # Example
///
/// ```ignore
/// let system = InventorySystem::start(&InventoryConfig::default()).await?;
/// let message = system.catalog.buy(ProductId(2)).await?;
/// system.shutdown().await?;
/// ```
pub struct InventorySystem {
    /// Catalog service; stock changes go through the router.
    pub catalog: CatalogService,

    /// Warehouse service, for callers that own it (its REST routes).
    pub stock: StockService,

    pub changes: ChangeFeed,

    store: StoreClient<Product>,

    /// Router first, then store: the router holds a store client.
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl InventorySystem {
    /// Spawns the store and the stock router, wires the catalog, then runs the
    /// seed-on-empty bootstrap if `config.seed_on_empty` is set.
    pub async fn start(config: &InventoryConfig) -> Result<Self, InventoryError> {
        let changes = ChangeFeed::new(config.change_feed_capacity);

        let (store, store_client) = EntityStore::<Product>::new(config.store_buffer);
        let store_handle = tokio::spawn(store.run());

        let stock = StockService::new(store_client.clone(), config.stock_policy, changes.clone());
        let (router, stock_client) =
            StockRouter::new(config.router_buffer, stock.clone(), config.call_timeout());
        let router_handle = tokio::spawn(router.run());

        let catalog = CatalogService::new(store_client.clone(), stock_client, changes.clone());

        let system = Self {
            catalog,
            stock,
            changes,
            store: store_client,
            handles: vec![("router", router_handle), ("store", store_handle)],
        };

        if config.seed_on_empty {
            seed_if_empty(&system.store, sample_catalog()).await?;
        }

        info!(
            policy = ?system.stock.policy(),
            call_timeout = ?config.call_timeout(),
            "Inventory system started"
        );
        Ok(system)
    }

    /// Direct access to the shared store.
    pub fn store(&self) -> &StoreClient<Product> {
        &self.store
    }

    /// Drops every client held here and waits for the tasks to finish.
    ///
    /// Clones of the catalog or the stock service handed out earlier keep their
    /// channels open, so drop them first.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down inventory system...");

        drop(self.catalog);
        drop(self.stock);
        drop(self.store);

        for (name, handle) in self.handles {
            if let Err(e) = handle.await {
                error!(task = name, "Task failed: {:?}", e);
                return Err(format!("{} task failed: {:?}", name, e));
            }
        }

        info!("Inventory system shutdown complete.");
        Ok(())
    }
}
