//! # Store Messages
//!
//! This module defines the request type exchanged between the [`StoreClient`](crate::StoreClient)
//! and the [`EntityStore`](crate::EntityStore) task.

use crate::entity::StoreEntity;
use crate::error::StoreError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the store.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// One window of a filtered, id-ordered result.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Records inside the window.
    pub items: Vec<T>,
    /// Records matching the query, ignoring `offset` and `limit`.
    pub total: usize,
}

/// Request sent to the store task.
///
/// The variants mirror the persistence interface: lookups by id and by query (whole or windowed), atomic
/// update by id, single and bulk inserts, removal, and a record count. Every variant
/// carries its own typed reply channel, so a `FindById` can only ever be answered
/// with an `Option<T>`.
#[derive(Debug)]
pub enum StoreRequest<T: StoreEntity> {
    Insert {
        params: T::Create,
        respond_to: Response<T>,
    },
    InsertMany {
        batch: Vec<T::Create>,
        respond_to: Response<Vec<T::Id>>,
    },
    FindById {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Find {
        query: T::Query,
        respond_to: Response<Vec<T>>,
    },
    FindPage {
        query: T::Query,
        offset: usize,
        limit: Option<usize>,
        respond_to: Response<Page<T>>,
    },
    Count {
        respond_to: Response<usize>,
    },
    UpdateById {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Remove {
        id: T::Id,
        respond_to: Response<T>,
    },
}

impl<T: StoreEntity> StoreRequest<T> {
    /// Short operation name, used in mock diagnostics.
    pub fn operation(&self) -> &'static str {
        match self {
            StoreRequest::Insert { .. } => "insert",
            StoreRequest::InsertMany { .. } => "insert_many",
            StoreRequest::FindById { .. } => "find_by_id",
            StoreRequest::Find { .. } => "find",
            StoreRequest::FindPage { .. } => "find_page",
            StoreRequest::Count { .. } => "count",
            StoreRequest::UpdateById { .. } => "update_by_id",
            StoreRequest::Remove { .. } => "remove",
        }
    }
}
