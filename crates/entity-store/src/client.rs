//! # Store Client
//!
//! This module defines the cloneable handle used to talk to an [`EntityStore`](crate::EntityStore).

use crate::entity::StoreEntity;
use crate::error::StoreError;
use crate::message::{Page, Response, StoreRequest};
use tokio::sync::{mpsc, oneshot};

/// A type-safe handle for sending requests to an `EntityStore`.
///
/// The client holds only the sending half of the request channel, so cloning is cheap
/// and clones can be moved freely between tasks. Each method sends one request and
/// waits for its typed reply.
#[derive(Clone)]
pub struct StoreClient<T: StoreEntity> {
    sender: mpsc::Sender<StoreRequest<T>>,
}

impl<T: StoreEntity> StoreClient<T> {
    pub fn new(sender: mpsc::Sender<StoreRequest<T>>) -> Self {
        Self { sender }
    }

    async fn call<R>(
        &self,
        request: impl FnOnce(Response<R>) -> StoreRequest<T>,
    ) -> Result<R, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(request(respond_to))
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    pub async fn insert(&self, params: T::Create) -> Result<T, StoreError> {
        self.call(|respond_to| StoreRequest::Insert { params, respond_to })
            .await
    }

    /// Inserts every record or none of them.
    pub async fn insert_many(&self, batch: Vec<T::Create>) -> Result<Vec<T::Id>, StoreError> {
        self.call(|respond_to| StoreRequest::InsertMany { batch, respond_to })
            .await
    }

    pub async fn find_by_id(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        self.call(|respond_to| StoreRequest::FindById { id, respond_to })
            .await
    }

    pub async fn find(&self, query: T::Query) -> Result<Vec<T>, StoreError> {
        self.call(|respond_to| StoreRequest::Find { query, respond_to })
            .await
    }

    /// Skips `offset` matches and returns at most `limit` of the rest, plus the match count.
    pub async fn find_page(
        &self,
        query: T::Query,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Page<T>, StoreError> {
        self.call(|respond_to| StoreRequest::FindPage {
            query,
            offset,
            limit,
            respond_to,
        })
        .await
    }

    pub async fn count(&self) -> Result<usize, StoreError> {
        self.call(|respond_to| StoreRequest::Count { respond_to })
            .await
    }

    /// Applies `update` atomically and returns the record as committed.
    pub async fn update_by_id(&self, id: T::Id, update: T::Update) -> Result<T, StoreError> {
        self.call(|respond_to| StoreRequest::UpdateById {
            id,
            update,
            respond_to,
        })
        .await
    }

    pub async fn remove(&self, id: T::Id) -> Result<T, StoreError> {
        self.call(|respond_to| StoreRequest::Remove { id, respond_to })
            .await
    }
}
