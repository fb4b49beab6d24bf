//! # Call Router
//!
//! Carries named calls from the catalog to the warehouse. The catalog holds a
//! [`StockClient`]; the warehouse sits behind a [`StockRouter`]. Both ends speak
//! [`StockApi`], so catalog code is written once against the trait and can be pointed
//! at the router, at a [`StockService`](crate::warehouse::StockService) directly, or at
//! a test double.
//!
//! Delivery is at most once. A call that gets no reply within the client's timeout
//! fails with [`InventoryError::CallTimeout`](crate::error::InventoryError::CallTimeout)
//! and is never retried, since the warehouse may already have applied it.

pub mod client;
pub mod dispatch;

pub use client::StockClient;
pub use dispatch::StockRouter;

use crate::error::InventoryError;
use crate::model::{Product, ProductId};
use crate::warehouse::StockService;
use async_trait::async_trait;
use tokio::sync::oneshot;

/// Action name of the stock read.
pub const PRODUCT_COUNT: &str = "warehouse.productCount";
/// Action name of the stock decrement.
pub const DECREASE_QUANTITY: &str = "warehouse.decreaseQuantity";

/// Operations the warehouse exposes to other services.
#[async_trait]
pub trait StockApi: Send + Sync {
    /// Returns the product record with its current quantity.
    async fn count(&self, id: ProductId) -> Result<Product, InventoryError>;

    /// Atomically removes `value` units and returns the updated record.
    async fn decrease(&self, id: ProductId, value: i64) -> Result<Product, InventoryError>;
}

#[async_trait]
impl StockApi for StockService {
    async fn count(&self, id: ProductId) -> Result<Product, InventoryError> {
        StockService::count(self, id).await
    }

    async fn decrease(&self, id: ProductId, value: i64) -> Result<Product, InventoryError> {
        StockService::decrease(self, id, value).await
    }
}

pub type Reply<T> = oneshot::Sender<Result<T, InventoryError>>;

/// A call travelling from a [`StockClient`] to a [`StockRouter`].
#[derive(Debug)]
pub enum StockCall {
    Count {
        id: ProductId,
        respond_to: Reply<Product>,
    },
    Decrease {
        id: ProductId,
        value: i64,
        respond_to: Reply<Product>,
    },
}

impl StockCall {
    pub fn action(&self) -> &'static str {
        match self {
            StockCall::Count { .. } => PRODUCT_COUNT,
            StockCall::Decrease { .. } => DECREASE_QUANTITY,
        }
    }
}
