//! # Inventory
//!
//! Two services over one product store: a catalog that lists and sells products, and
//! a warehouse that owns stock levels.
//!
//! - **[model]**: the [`Product`](model::Product) record and its store behavior.
//! - **[catalog]**: product CRUD, the in-stock listing and the `buy` flow.
//! - **[warehouse]**: `count` and the atomic `decrease`.
//! - **[router]**: named, timeout-bounded calls from the catalog to the warehouse.
//! - **[events]**: change notifications published after each committed write.
//! - **[lifecycle]**: [`InventorySystem`](lifecycle::InventorySystem) startup, seeding and shutdown.
//! - **[api]**: the axum REST surface.
//!
//! Persistence is the [`entity_store`] crate. See [`entity_store::mock`] for testing
//! services without a live store.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod model;
pub mod router;
pub mod warehouse;
