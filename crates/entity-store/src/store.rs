//! # Entity Store Task
//!
//! This module defines the `EntityStore`, the task that owns every record of one entity
//! type. It processes requests sequentially, so each request observes and leaves the
//! map in a consistent state without any locking.

use crate::client::StoreClient;
use crate::entity::StoreEntity;
use crate::error::StoreError;
use crate::message::{Page, StoreRequest};
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The store that owns a collection of records.
///
/// # Concurrency Model
/// The store is the "server" half: it owns the map and the receiving end of the
/// channel. Any number of [`StoreClient`] clones may send requests concurrently, but
/// the store handles them one at a time. An `UpdateById` is therefore a single
/// indivisible step from the point of view of every other caller, which is the
/// atomic-increment guarantee the persistence interface promises.
///
/// # Usage Pattern
///
/// ```rust
/// use entity_store::{EntityStore, StoreEntity};
///
/// #[derive(Clone, Debug)]
/// struct Counter { id: u32, value: i64 }
/// #[derive(Debug)] struct NewCounter;
/// #[derive(Debug)] struct AllCounters;
/// #[derive(Debug)] struct Add(i64);
/// #[derive(Debug, thiserror::Error)] #[error("counter error")] struct CounterError;
///
/// impl StoreEntity for Counter {
///     type Id = u32;
///     type Create = NewCounter;
///     type Query = AllCounters;
///     type Update = Add;
///     type Error = CounterError;
///
///     fn from_create_params(id: u32, _: NewCounter) -> Result<Self, Self::Error> {
///         Ok(Self { id, value: 0 })
///     }
///     fn matches(&self, _: &AllCounters) -> bool { true }
///     fn apply_update(&mut self, update: Add) -> Result<(), Self::Error> {
///         self.value += update.0;
///         Ok(())
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (store, client) = EntityStore::<Counter>::new(10);
///     tokio::spawn(store.run());
///
///     let counter = client.insert(NewCounter).await.unwrap();
///     let counter = client.update_by_id(counter.id, Add(5)).await.unwrap();
///     assert_eq!(counter.value, 5);
/// }
/// ```
///
/// # Operations
///
/// * **Insert / InsertMany**: assign ids from an internal `u32` counter, build each record
///   with `T::from_create_params`, then store. A bulk insert stores nothing if any record
///   fails to build, and consumes no ids in that case.
/// * **FindById / Find / FindPage / Count**: read-only; finds return matches ordered by id,
///   and `FindPage` also reports how many records matched in total.
/// * **UpdateById**: applies the update to a copy and commits the copy only if the
///   entity accepted it.
/// * **Remove**: deletes and returns the record.
pub struct EntityStore<T: StoreEntity> {
    receiver: mpsc::Receiver<StoreRequest<T>>,
    records: BTreeMap<T::Id, T>,
    next_id: u32,
}

impl<T: StoreEntity> EntityStore<T> {
    /// Creates a new `EntityStore` and its associated `StoreClient`.
    ///
    /// `buffer_size` is the capacity of the request channel. When it is full, client
    /// calls wait for space.
    pub fn new(buffer_size: usize) -> (Self, StoreClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let store = Self {
            receiver,
            records: BTreeMap::new(),
            next_id: 1,
        };
        (store, StoreClient::new(sender))
    }

    /// Runs the store loop until every client has been dropped.
    pub async fn run(mut self) {
        // Just the type name, e.g. "Product" rather than "inventory::model::product::Product"
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Insert { params, respond_to } => {
                    debug!(entity_type, ?params, "Insert");
                    let id = T::Id::from(self.next_id);
                    match T::from_create_params(id.clone(), params) {
                        Ok(item) => {
                            self.next_id += 1;
                            self.records.insert(id.clone(), item.clone());
                            info!(entity_type, %id, size = self.records.len(), "Inserted");
                            let _ = respond_to.send(Ok(item));
                        }
                        Err(e) => {
                            warn!(entity_type, error = %e, "Insert rejected");
                            let _ = respond_to.send(Err(StoreError::Entity(Box::new(e))));
                        }
                    }
                }
                StoreRequest::InsertMany { batch, respond_to } => {
                    debug!(entity_type, count = batch.len(), "InsertMany");
                    let _ = respond_to.send(self.insert_many(batch, entity_type));
                }
                StoreRequest::FindById { id, respond_to } => {
                    let item = self.records.get(&id).cloned();
                    debug!(entity_type, %id, found = item.is_some(), "FindById");
                    let _ = respond_to.send(Ok(item));
                }
                StoreRequest::Find { query, respond_to } => {
                    let items: Vec<T> = self
                        .records
                        .values()
                        .filter(|item| item.matches(&query))
                        .cloned()
                        .collect();
                    debug!(entity_type, ?query, matched = items.len(), "Find");
                    let _ = respond_to.send(Ok(items));
                }
                StoreRequest::FindPage {
                    query,
                    offset,
                    limit,
                    respond_to,
                } => {
                    let mut items = Vec::new();
                    let mut total = 0;
                    for item in self.records.values().filter(|item| item.matches(&query)) {
                        if total >= offset && limit.map_or(true, |limit| items.len() < limit) {
                            items.push(item.clone());
                        }
                        total += 1;
                    }
                    debug!(entity_type, ?query, offset, ?limit, total, "FindPage");
                    let _ = respond_to.send(Ok(Page { items, total }));
                }
                StoreRequest::Count { respond_to } => {
                    let _ = respond_to.send(Ok(self.records.len()));
                }
                StoreRequest::UpdateById {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "UpdateById");
                    let Some(item) = self.records.get_mut(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(StoreError::NotFound(id.to_string())));
                        continue;
                    };
                    // All-or-nothing: commit the copy only once the entity accepts the change.
                    let mut next = item.clone();
                    match next.apply_update(update) {
                        Ok(()) => {
                            *item = next.clone();
                            info!(entity_type, %id, "Updated");
                            let _ = respond_to.send(Ok(next));
                        }
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Update rejected");
                            let _ = respond_to.send(Err(StoreError::Entity(Box::new(e))));
                        }
                    }
                }
                StoreRequest::Remove { id, respond_to } => {
                    debug!(entity_type, %id, "Remove");
                    match self.records.remove(&id) {
                        Some(item) => {
                            info!(entity_type, %id, size = self.records.len(), "Removed");
                            let _ = respond_to.send(Ok(item));
                        }
                        None => {
                            warn!(entity_type, %id, "Not found");
                            let _ = respond_to.send(Err(StoreError::NotFound(id.to_string())));
                        }
                    }
                }
            }
        }

        info!(entity_type, size = self.records.len(), "Shutdown");
    }

    fn insert_many(
        &mut self,
        batch: Vec<T::Create>,
        entity_type: &str,
    ) -> Result<Vec<T::Id>, StoreError> {
        let mut built = Vec::with_capacity(batch.len());
        let mut next_id = self.next_id;
        for params in batch {
            let id = T::Id::from(next_id);
            next_id += 1;
            let item = T::from_create_params(id.clone(), params).map_err(|e| {
                warn!(entity_type, error = %e, "InsertMany rejected");
                StoreError::Entity(Box::new(e))
            })?;
            built.push((id, item));
        }

        self.next_id = next_id;
        let ids: Vec<T::Id> = built.iter().map(|(id, _)| id.clone()).collect();
        self.records.extend(built);
        info!(entity_type, inserted = ids.len(), size = self.records.len(), "Inserted batch");
        Ok(ids)
    }
}
