//! Runtime configuration.
//!
//! Settings are read from an optional `inventory.toml` in the working directory and
//! then from `INVENTORY_*` environment variables, which win. Every field has a default,
//! so an empty environment yields a working configuration.
//!
//! ```bash
//! INVENTORY_STOCK_POLICY=permissive INVENTORY_CALL_TIMEOUT_MS=250 cargo run
//! ```

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_BUFFER: usize = 32;
const DEFAULT_CALL_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_CHANGE_FEED_CAPACITY: usize = 64;

/// How the warehouse treats a decrement larger than the stock on hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockPolicy {
    /// Refuse with `InsufficientStock`; quantity never goes below zero.
    #[default]
    Strict,
    /// Apply the decrement unconditionally; quantity may go negative.
    Permissive,
}

impl StockPolicy {
    /// Lowest quantity a decrement may leave behind, if any.
    pub fn floor(self) -> Option<i64> {
        match self {
            StockPolicy::Strict => Some(0),
            StockPolicy::Permissive => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InventoryConfig {
    /// Address the REST surface binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Capacity of the entity store request channel.
    #[serde(default = "default_buffer")]
    pub store_buffer: usize,

    /// Capacity of the stock router request channel.
    #[serde(default = "default_buffer")]
    pub router_buffer: usize,

    /// Upper bound on a catalog-to-warehouse call, in milliseconds.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    #[serde(default)]
    pub stock_policy: StockPolicy,

    /// Insert the sample catalog at startup when the store is empty.
    #[serde(default = "default_true")]
    pub seed_on_empty: bool,

    #[serde(default = "default_change_feed_capacity")]
    pub change_feed_capacity: usize,
}

fn default_listen_addr() -> String {
    DEFAULT_LISTEN_ADDR.to_string()
}

fn default_buffer() -> usize {
    DEFAULT_BUFFER
}

fn default_call_timeout_ms() -> u64 {
    DEFAULT_CALL_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

fn default_change_feed_capacity() -> usize {
    DEFAULT_CHANGE_FEED_CAPACITY
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            store_buffer: DEFAULT_BUFFER,
            router_buffer: DEFAULT_BUFFER,
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
            stock_policy: StockPolicy::default(),
            seed_on_empty: true,
            change_feed_capacity: DEFAULT_CHANGE_FEED_CAPACITY,
        }
    }
}

impl InventoryConfig {
    /// Loads `inventory.toml` (optional) and `INVENTORY_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config: InventoryConfig = Config::builder()
            .add_source(File::with_name("inventory").required(false))
            .add_source(Environment::with_prefix("INVENTORY").try_parsing(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        info!(
            listen_addr = %config.listen_addr,
            policy = ?config.stock_policy,
            call_timeout_ms = config.call_timeout_ms,
            "Configuration loaded"
        );
        Ok(config)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.call_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "call_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.store_buffer == 0 || self.router_buffer == 0 || self.change_feed_capacity == 0 {
            return Err(ConfigError::Message(
                "channel capacities must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
