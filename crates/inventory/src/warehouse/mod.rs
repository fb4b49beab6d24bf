//! The warehouse service: owns stock levels.
//!
//! Other components never write `quantity` directly. They go through
//! [`StockService`], usually behind the [`crate::router`].

pub mod service;

pub use service::StockService;
