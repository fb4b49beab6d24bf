//! # Mock Store & Testing Guide
//!
//! `MockStore<T>` hands out a real [`StoreClient<T>`] whose requests are answered from a
//! queue of expectations instead of a live [`EntityStore`](crate::EntityStore). Use it to
//! test the code *around* the store: services that must issue exactly a given sequence of
//! requests, or must react correctly to store failures that are hard to provoke for real.
//!
//! | Feature | MockStore | Real EntityStore |
//! |---------|-----------|------------------|
//! | **State** | None, answers are scripted | Real records |
//! | **Use Case** | Asserting which requests are (not) sent | Behaviour of data under concurrency |
//! | **Error Injection** | Easy (`return_err`) | Needs a specific state |
//!
//! ## Proving that nothing was written
//!
//! Requests that arrive with no matching expectation are recorded, not answered, and
//! [`MockStore::verify`] fails on them. Queue only the reads you expect; any write the
//! code under test slips in will be reported.
//!
//! ```rust
//! use entity_store::mock::MockStore;
//! use entity_store::{StoreEntity, StoreError};
//!
//! #[derive(Clone, Debug)] struct Counter { id: u32 }
//! #[derive(Debug)] struct NewCounter;
//! #[derive(Debug)] struct AllCounters;
//! #[derive(Debug)] struct Add(i64);
//! #[derive(Debug, thiserror::Error)] #[error("counter error")] struct CounterError;
//!
//! impl StoreEntity for Counter {
//!     type Id = u32; type Create = NewCounter; type Query = AllCounters;
//!     type Update = Add; type Error = CounterError;
//!     fn from_create_params(id: u32, _: NewCounter) -> Result<Self, Self::Error> { Ok(Self { id }) }
//!     fn matches(&self, _: &AllCounters) -> bool { true }
//!     fn apply_update(&mut self, _: Add) -> Result<(), Self::Error> { Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockStore::<Counter>::new();
//!     mock.expect_find_by_id(1).return_ok(None);
//!
//!     let client = mock.client();
//!     assert!(client.find_by_id(1).await.unwrap().is_none());
//!
//!     // Unscripted write: answered with `Dropped` and reported by `verify`.
//!     let result = client.update_by_id(1, Add(-1)).await;
//!     assert!(matches!(result, Err(StoreError::Dropped)));
//!     assert_eq!(mock.unexpected(), vec!["update_by_id".to_string()]);
//! }
//! ```
//!
//! ## Inspecting raw requests
//!
//! Use [`create_mock_store`] together with [`expect_update_by_id`] when a test needs to
//! look at the exact update payload a caller sent.

use crate::client::StoreClient;
use crate::entity::StoreEntity;
use crate::error::StoreError;
use crate::message::{Page, Response, StoreRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// A scripted reply for one expected request.
enum Expectation<T: StoreEntity> {
    Insert(Result<T, StoreError>),
    InsertMany(Result<Vec<T::Id>, StoreError>),
    FindById {
        id: T::Id,
        response: Result<Option<T>, StoreError>,
    },
    Find(Result<Vec<T>, StoreError>),
    FindPage(Result<Page<T>, StoreError>),
    Count(Result<usize, StoreError>),
    UpdateById {
        id: T::Id,
        response: Result<T, StoreError>,
    },
    Remove {
        id: T::Id,
        response: Result<T, StoreError>,
    },
}

struct Script<T: StoreEntity> {
    expectations: VecDeque<Expectation<T>>,
    unexpected: Vec<String>,
}

type SharedScript<T> = Arc<Mutex<Script<T>>>;

fn reply<R>(respond_to: Response<R>, response: Result<R, StoreError>) {
    let _ = respond_to.send(response);
}

/// A mock store with expectation tracking for fluent testing.
pub struct MockStore<T: StoreEntity> {
    client: StoreClient<T>,
    script: SharedScript<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: StoreEntity> Default for MockStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StoreEntity> MockStore<T> {
    /// Creates a mock with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<StoreRequest<T>>(100);
        let script: SharedScript<T> = Arc::new(Mutex::new(Script {
            expectations: VecDeque::new(),
            unexpected: Vec::new(),
        }));
        let shared = script.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let mut script = shared.lock().unwrap();
                let next = script.expectations.pop_front();
                match (request, next) {
                    (StoreRequest::Insert { respond_to, .. }, Some(Expectation::Insert(r))) => {
                        reply(respond_to, r)
                    }
                    (
                        StoreRequest::InsertMany { respond_to, .. },
                        Some(Expectation::InsertMany(r)),
                    ) => reply(respond_to, r),
                    (
                        StoreRequest::FindById { id, respond_to },
                        Some(Expectation::FindById { id: expected, response }),
                    ) if id == expected => reply(respond_to, response),
                    (StoreRequest::Find { respond_to, .. }, Some(Expectation::Find(r))) => {
                        reply(respond_to, r)
                    }
                    (
                        StoreRequest::FindPage { respond_to, .. },
                        Some(Expectation::FindPage(r)),
                    ) => reply(respond_to, r),
                    (StoreRequest::Count { respond_to }, Some(Expectation::Count(r))) => {
                        reply(respond_to, r)
                    }
                    (
                        StoreRequest::UpdateById { id, respond_to, .. },
                        Some(Expectation::UpdateById { id: expected, response }),
                    ) if id == expected => reply(respond_to, response),
                    (
                        StoreRequest::Remove { id, respond_to },
                        Some(Expectation::Remove { id: expected, response }),
                    ) if id == expected => reply(respond_to, response),
                    (request, unmatched) => {
                        // Dropping the request drops its reply channel: the caller sees `Dropped`.
                        script.unexpected.push(request.operation().to_string());
                        if let Some(expectation) = unmatched {
                            script.expectations.push_front(expectation);
                        }
                    }
                }
            }
        });

        Self {
            client: StoreClient::new(sender),
            script,
            _handle: handle,
        }
    }

    /// Returns a client wired to this mock.
    pub fn client(&self) -> StoreClient<T> {
        self.client.clone()
    }

    pub fn expect_insert(&mut self) -> ExpectationBuilder<T, T> {
        self.builder(Expectation::Insert)
    }

    pub fn expect_insert_many(&mut self) -> ExpectationBuilder<T, Vec<T::Id>> {
        self.builder(Expectation::InsertMany)
    }

    pub fn expect_find_by_id(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        self.builder(move |response| Expectation::FindById { id, response })
    }

    pub fn expect_find(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        self.builder(Expectation::Find)
    }

    pub fn expect_find_page(&mut self) -> ExpectationBuilder<T, Page<T>> {
        self.builder(Expectation::FindPage)
    }

    pub fn expect_count(&mut self) -> ExpectationBuilder<T, usize> {
        self.builder(Expectation::Count)
    }

    pub fn expect_update_by_id(&mut self, id: T::Id) -> ExpectationBuilder<T, T> {
        self.builder(move |response| Expectation::UpdateById { id, response })
    }

    pub fn expect_remove(&mut self, id: T::Id) -> ExpectationBuilder<T, T> {
        self.builder(move |response| Expectation::Remove { id, response })
    }

    fn builder<R>(
        &mut self,
        make: impl FnOnce(Result<R, StoreError>) -> Expectation<T> + Send + 'static,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            make: Box::new(make),
            script: self.script.clone(),
        }
    }

    /// Operation names of requests that matched no expectation, in arrival order.
    pub fn unexpected(&self) -> Vec<String> {
        self.script.lock().unwrap().unexpected.clone()
    }

    /// Panics unless every expectation was consumed and no unexpected request arrived.
    pub fn verify(&self) {
        let script = self.script.lock().unwrap();
        if !script.unexpected.is_empty() {
            panic!("Unexpected store requests: {:?}", script.unexpected);
        }
        if !script.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                script.expectations.len()
            );
        }
    }
}

/// Builder returned by the `expect_*` methods of [`MockStore`].
pub struct ExpectationBuilder<T: StoreEntity, R> {
    make: Box<dyn FnOnce(Result<R, StoreError>) -> Expectation<T> + Send>,
    script: SharedScript<T>,
}

impl<T: StoreEntity, R> ExpectationBuilder<T, R> {
    /// Answers the expected request successfully.
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    /// Answers the expected request with an error.
    pub fn return_err(self, error: StoreError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, StoreError>) {
        let expectation = (self.make)(response);
        self.script
            .lock()
            .unwrap()
            .expectations
            .push_back(expectation);
    }
}

// =============================================================================
// RAW REQUEST HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
pub fn create_mock_store<T: StoreEntity>(
    buffer_size: usize,
) -> (StoreClient<T>, mpsc::Receiver<StoreRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Waits for the next request and returns it if it is an `UpdateById`.
pub async fn expect_update_by_id<T: StoreEntity>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T::Id, T::Update, Response<T>)> {
    match receiver.recv().await {
        Some(StoreRequest::UpdateById {
            id,
            update,
            respond_to,
        }) => Some((id, update, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Item {
        id: u32,
        label: String,
    }

    #[derive(Debug)]
    struct NewItem;

    #[derive(Debug)]
    struct AnyItem;

    #[derive(Debug)]
    struct Relabel(String);

    #[derive(Debug, thiserror::Error)]
    #[error("item error")]
    struct ItemError;

    impl StoreEntity for Item {
        type Id = u32;
        type Create = NewItem;
        type Query = AnyItem;
        type Update = Relabel;
        type Error = ItemError;

        fn from_create_params(id: u32, _: NewItem) -> Result<Self, Self::Error> {
            Ok(Self {
                id,
                label: String::new(),
            })
        }

        fn matches(&self, _: &AnyItem) -> bool {
            true
        }

        fn apply_update(&mut self, update: Relabel) -> Result<(), Self::Error> {
            self.label = update.0;
            Ok(())
        }
    }

    fn item(id: u32, label: &str) -> Item {
        Item {
            id,
            label: label.to_string(),
        }
    }

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let mut mock = MockStore::<Item>::new();
        mock.expect_count().return_ok(0);
        mock.expect_find_by_id(7).return_ok(Some(item(7, "seven")));
        mock.expect_update_by_id(7)
            .return_err(StoreError::NotFound("7".into()));

        let client = mock.client();
        assert_eq!(client.count().await.unwrap(), 0);
        assert_eq!(client.find_by_id(7).await.unwrap(), Some(item(7, "seven")));
        let err = client
            .update_by_id(7, Relabel("x".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "7"));

        mock.verify();
    }

    #[tokio::test]
    async fn test_unexpected_request_is_recorded() {
        let mut mock = MockStore::<Item>::new();
        mock.expect_find_by_id(1).return_ok(None);

        let client = mock.client();
        // Wrong id: not answered, expectation stays queued.
        assert!(matches!(
            client.find_by_id(2).await,
            Err(StoreError::Dropped)
        ));
        assert!(client.find_by_id(1).await.unwrap().is_none());
        assert_eq!(mock.unexpected(), vec!["find_by_id".to_string()]);
    }

    #[tokio::test]
    async fn test_raw_update_request_can_be_inspected() {
        let (client, mut receiver) = create_mock_store::<Item>(4);

        let task = tokio::spawn(async move { client.update_by_id(3, Relabel("new".into())).await });

        let (id, update, respond_to) = expect_update_by_id(&mut receiver)
            .await
            .expect("Expected UpdateById request");
        assert_eq!(id, 3);
        assert_eq!(update.0, "new");
        respond_to.send(Ok(item(3, "new"))).unwrap();

        assert_eq!(task.await.unwrap().unwrap(), item(3, "new"));
    }

    #[tokio::test]
    async fn test_every_builder_answers_its_request() {
        let mut mock = MockStore::<Item>::new();
        mock.expect_insert().return_ok(item(1, ""));
        mock.expect_insert_many().return_ok(vec![2, 3]);
        mock.expect_find().return_ok(vec![item(1, "one")]);
        mock.expect_find_page().return_ok(Page {
            items: vec![item(3, "three")],
            total: 3,
        });
        mock.expect_remove(2).return_ok(item(2, "two"));
        mock.expect_find().return_err(StoreError::Closed);

        let client = mock.client();
        assert_eq!(client.insert(NewItem).await.unwrap(), item(1, ""));
        assert_eq!(
            client.insert_many(vec![NewItem, NewItem]).await.unwrap(),
            vec![2, 3]
        );
        assert_eq!(client.find(AnyItem).await.unwrap(), vec![item(1, "one")]);

        let page = client.find_page(AnyItem, 2, Some(1)).await.unwrap();
        assert_eq!(page.items, vec![item(3, "three")]);
        assert_eq!(page.total, 3);

        assert_eq!(client.remove(2).await.unwrap(), item(2, "two"));
        assert!(matches!(
            client.find(AnyItem).await,
            Err(StoreError::Closed)
        ));

        mock.verify();
    }

    #[tokio::test]
    async fn test_request_of_the_wrong_kind_is_not_answered() {
        let mut mock = MockStore::<Item>::new();
        mock.expect_remove(4).return_ok(item(4, "four"));

        let client = mock.client();
        // A find where a remove was scripted.
        assert!(matches!(client.find(AnyItem).await, Err(StoreError::Dropped)));
        assert_eq!(mock.unexpected(), vec!["find".to_string()]);

        assert_eq!(client.remove(4).await.unwrap().id, 4);
    }
}
