//! # Store Errors
//!
//! Every [`StoreClient`](crate::StoreClient) call fails with one of two kinds of error:
//!
//! - the store could not be reached or did not answer ([`StoreError::Closed`],
//!   [`StoreError::Dropped`]). Nothing is known about whether a write took effect
//!   for `Dropped`; for `Closed` the request never arrived.
//! - the store answered and refused the request ([`StoreError::NotFound`],
//!   [`StoreError::Entity`]). The stored records are unchanged in both cases.
//!
//! Services usually translate the first kind into their own "store unavailable"
//! error and inspect the second.

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request channel is closed: the store task has stopped.
    #[error("Store closed")]
    Closed,
    /// The reply channel was dropped before an answer arrived.
    #[error("Store dropped response channel")]
    Dropped,
    /// No record has the given id (rendered with the id's `Display`).
    #[error("Record not found: {0}")]
    NotFound(String),
    /// `StoreEntity::from_create_params` or `apply_update` refused the request.
    /// Downcast to the entity's own error type to recover it.
    #[error("Entity error: {0}")]
    Entity(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// `true` for `Closed` and `Dropped`: the store, not the request, failed.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Closed | StoreError::Dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("too small")]
    struct TooSmall;

    #[test]
    fn test_only_transport_failures_are_unavailable() {
        assert!(StoreError::Closed.is_unavailable());
        assert!(StoreError::Dropped.is_unavailable());
        assert!(!StoreError::NotFound("7".into()).is_unavailable());

        let refused = StoreError::Entity(Box::new(TooSmall));
        assert!(!refused.is_unavailable());
        assert_eq!(refused.to_string(), "Entity error: too small");
    }
}
