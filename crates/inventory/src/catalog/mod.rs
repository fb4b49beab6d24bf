//! The catalog service: product records and the purchase flow.

pub mod seed;
pub mod service;

pub use seed::{sample_catalog, seed_if_empty};
pub use service::{
    CatalogService, NewProduct, ProductDetails, ProductPage, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
