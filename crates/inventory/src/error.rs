//! Error types shared by the catalog and the warehouse.
//!
//! Both services report failures with [`InventoryError`]. A failure raised by the
//! warehouse crosses the call router as this same type, so the catalog returns it to
//! its own caller without re-wrapping it.

use crate::model::ProductError;
use entity_store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during catalog and stock operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InventoryError {
    /// The referenced product does not exist.
    #[error("Product not found")]
    NotFound(String),

    /// Malformed input, rejected before the store is touched.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The decrement would drive the quantity below zero.
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    /// The entity store failed or is gone.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A cross-service call got no answer in time. The remote side may still have
    /// applied it.
    #[error("Call to {action} timed out after {after:?}")]
    CallTimeout { action: &'static str, after: Duration },

    /// The service behind a cross-service call is not running.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(&'static str),
}

impl From<ProductError> for InventoryError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::Invalid { .. } => InventoryError::InvalidArgument(e.to_string()),
            ProductError::InsufficientStock {
                requested,
                available,
            } => InventoryError::InsufficientStock {
                requested,
                available,
            },
        }
    }
}

impl From<StoreError> for InventoryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => InventoryError::NotFound(id),
            StoreError::Entity(inner) => match inner.downcast::<ProductError>() {
                Ok(product_error) => (*product_error).into(),
                Err(other) => InventoryError::StoreUnavailable(other.to_string()),
            },
            StoreError::Closed | StoreError::Dropped => {
                InventoryError::StoreUnavailable(e.to_string())
            }
        }
    }
}
