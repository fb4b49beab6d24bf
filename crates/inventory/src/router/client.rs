use super::{Reply, StockApi, StockCall, DECREASE_QUANTITY, PRODUCT_COUNT};
use crate::error::InventoryError;
use crate::model::{Product, ProductId};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{instrument, warn};

const WAREHOUSE: &str = "warehouse";

/// Caller side of the router. Cheap to clone.
#[derive(Clone)]
pub struct StockClient {
    sender: mpsc::Sender<StockCall>,
    timeout: Duration,
}

impl StockClient {
    pub fn new(sender: mpsc::Sender<StockCall>, timeout: Duration) -> Self {
        Self { sender, timeout }
    }

    async fn call<R: Send>(
        &self,
        action: &'static str,
        request: impl FnOnce(Reply<R>) -> StockCall,
    ) -> Result<R, InventoryError> {
        let (respond_to, response) = oneshot::channel();
        let call = request(respond_to);

        // The bound covers queueing as well as the remote work.
        let exchange = async {
            self.sender
                .send(call)
                .await
                .map_err(|_| InventoryError::ServiceUnavailable(WAREHOUSE))?;
            response
                .await
                .map_err(|_| InventoryError::ServiceUnavailable(WAREHOUSE))?
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => {
                warn!(action, after = ?self.timeout, "Call timed out");
                Err(InventoryError::CallTimeout {
                    action,
                    after: self.timeout,
                })
            }
        }
    }
}

#[async_trait]
impl StockApi for StockClient {
    #[instrument(skip(self))]
    async fn count(&self, id: ProductId) -> Result<Product, InventoryError> {
        self.call(PRODUCT_COUNT, |respond_to| StockCall::Count { id, respond_to })
            .await
    }

    #[instrument(skip(self))]
    async fn decrease(&self, id: ProductId, value: i64) -> Result<Product, InventoryError> {
        self.call(DECREASE_QUANTITY, |respond_to| StockCall::Decrease {
            id,
            value,
            respond_to,
        })
        .await
    }
}
