use super::{StockCall, StockClient};
use crate::warehouse::StockService;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Receives [`StockCall`]s and runs each against the [`StockService`].
///
/// Every call gets its own task, so a slow call does not hold up the ones behind it.
/// Calls on the same product are still serialized by the entity store.
pub struct StockRouter {
    receiver: mpsc::Receiver<StockCall>,
    service: StockService,
}

impl StockRouter {
    /// Creates a router and a client bounded by `timeout`.
    pub fn new(buffer_size: usize, service: StockService, timeout: Duration) -> (Self, StockClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let router = Self { receiver, service };
        (router, StockClient::new(sender, timeout))
    }

    /// Runs until every [`StockClient`] has been dropped.
    pub async fn run(mut self) {
        info!("Stock router started");
        while let Some(call) = self.receiver.recv().await {
            let service = self.service.clone();
            tokio::spawn(dispatch(service, call));
        }
        info!("Stock router stopped");
    }
}

async fn dispatch(service: StockService, call: StockCall) {
    let action = call.action();
    debug!(action, "Dispatching call");
    let delivered = match call {
        StockCall::Count { id, respond_to } => respond_to.send(service.count(id).await).is_ok(),
        StockCall::Decrease {
            id,
            value,
            respond_to,
        } => respond_to.send(service.decrease(id, value).await).is_ok(),
    };
    if !delivered {
        warn!(action, "Caller went away before the reply");
    }
}
