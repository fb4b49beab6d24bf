//! # Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden (`with_target(false)`); records carry
//! structured fields such as `entity_type`, `id` and `action` instead.
//!
//! ```bash
//! # Purchases and stock changes
//! RUST_LOG=info cargo run
//!
//! # Full payloads at function entry, plus store traffic
//! RUST_LOG=debug cargo run
//!
//! # Only the store
//! RUST_LOG=entity_store=debug cargo run
//! ```
//!
//! A purchase at `info` looks like:
//!
//! ```text
//! INFO Updated entity_type="Product" id=product_2
//! INFO decrease{id=product_2 value=1}: Stock decreased quantity=24
//! INFO buy{id=product_2}: Purchase completed name=iPhone 11 Pro
//! ```
//!
//! The store and the stock router run on their own tasks, so their records are not
//! nested under the `buy` span.

/// Installs the global subscriber. Call once, from the binary.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
