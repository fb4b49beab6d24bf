//! # Entity Store
//!
//! An in-process document store built on the **Actor Model**: a single task owns every
//! record of one entity type and serves lookups, filtered finds, bulk inserts and
//! field-level atomic updates over a message channel.
//!
//! ## Why an actor?
//!
//! Services that share a record need one place where a change to it is decided. Here
//! that place is the store task:
//!
//! - Isolated state: the map is owned by one task, no `Mutex` or `RwLock`
//! - Message passing: callers hold a cheap, cloneable [`StoreClient`]
//! - Sequential processing: an update is applied between two other requests, never
//!   interleaved with them
//!
//! The last point is what lets a caller say "add -1 to `quantity`" and rely on the
//! result even when a hundred other callers say the same thing at once. No caller ever
//! reads a value, changes it, and writes it back.
//!
//! **Further Reading**:
//! - [Actors in Rust](https://ryhl.io/blog/actors-with-tokio/) - Practical guide to implementing actors with Tokio
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`StoreEntity`]) - how a record is built, filtered and updated
//! 2. **Runtime Layer** ([`EntityStore`]) - request processing and ownership of records
//! 3. **Interface Layer** ([`StoreClient`]) - typed async calls
//!
//! ```rust
//! use entity_store::{EntityStore, StoreEntity, StoreError};
//!
//! #[derive(Clone, Debug)]
//! struct Account { id: u32, balance: i64 }
//! #[derive(Debug)] struct Open { balance: i64 }
//! #[derive(Debug)] enum AccountQuery { InCredit }
//! #[derive(Debug)] struct Withdraw(i64);
//! #[derive(Debug, thiserror::Error)]
//! #[error("overdrawn")]
//! struct Overdrawn;
//!
//! impl StoreEntity for Account {
//!     type Id = u32;
//!     type Create = Open;
//!     type Query = AccountQuery;
//!     type Update = Withdraw;
//!     type Error = Overdrawn;
//!
//!     fn from_create_params(id: u32, params: Open) -> Result<Self, Self::Error> {
//!         Ok(Self { id, balance: params.balance })
//!     }
//!     fn matches(&self, query: &AccountQuery) -> bool {
//!         match query { AccountQuery::InCredit => self.balance > 0 }
//!     }
//!     fn apply_update(&mut self, update: Withdraw) -> Result<(), Self::Error> {
//!         if self.balance < update.0 { return Err(Overdrawn); }
//!         self.balance -= update.0;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (store, client) = EntityStore::<Account>::new(16);
//!     tokio::spawn(store.run());
//!
//!     let ids = client.insert_many(vec![Open { balance: 10 }, Open { balance: 0 }]).await.unwrap();
//!     assert_eq!(client.find(AccountQuery::InCredit).await.unwrap().len(), 1);
//!
//!     let result = client.update_by_id(ids[0], Withdraw(50)).await;
//!     assert!(matches!(result, Err(StoreError::Entity(_))));
//!     assert_eq!(client.find_by_id(ids[0]).await.unwrap().unwrap().balance, 10);
//! }
//! ```
//!
//! ## Testing
//!
//! The [`mock`] module provides `MockStore`, a scripted stand-in that hands out a real
//! `StoreClient` and reports any request it was not told to expect.

pub mod client;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod store;

pub use client::StoreClient;
pub use entity::StoreEntity;
pub use error::StoreError;
pub use message::{Page, Response, StoreRequest};
pub use store::EntityStore;
