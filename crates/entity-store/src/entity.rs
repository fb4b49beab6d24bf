//! # StoreEntity Trait
//!
//! The `StoreEntity` trait is the contract a record type satisfies to be kept by the
//! generic [`EntityStore`](crate::EntityStore). It names the id, the creation payload,
//! the query filter and the atomic update for the record, and the error the record
//! raises when one of those is rejected.
//!
//! # Atomic Updates
//! An update is described as data (`Self::Update`) and applied *inside* the store task.
//! Callers never read a record, change it locally and write it back; they hand the
//! store a description of the change and the store applies it between two other
//! requests. That is what makes an increment safe under concurrent callers.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any record must implement to be kept by an [`EntityStore`](crate::EntityStore).
///
/// # Associated Types
/// A `Product` store takes a `ProductCreate` payload and a `ProductUpdate` change, and the
/// compiler refuses a `UserCreate` sent to it. Each store instance is therefore typed
/// end to end: requests, replies and errors.
pub trait StoreEntity: Clone + Send + Sync + 'static {
    /// The unique identifier. Must be convertible from `u32` for automatic id generation,
    /// and ordered so that `find` returns records in a stable order.
    type Id: Eq + Ord + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// The data required to create a new record.
    type Create: Send + Sync + Debug;

    /// Filter evaluated by `find`.
    type Query: Send + Sync + Debug;

    /// A field-level change applied atomically by `update_by_id`.
    type Update: Send + Sync + Debug;

    /// The error raised when a record cannot be built or an update is rejected.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full record from the assigned id and the payload.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Returns `true` when this record satisfies `query`.
    fn matches(&self, query: &Self::Query) -> bool;

    /// Apply `update` to this record.
    ///
    /// The store calls this on a scratch copy and only commits the copy on `Ok`,
    /// so an implementation may return early after partially mutating `self`.
    fn apply_update(&mut self, update: Self::Update) -> Result<(), Self::Error>;
}
