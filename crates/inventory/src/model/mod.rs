//! Pure data structures implementing the [`StoreEntity`](entity_store::StoreEntity) trait.

pub mod product;

pub use product::*;
