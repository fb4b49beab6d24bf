pub mod system;
pub mod telemetry;

pub use system::InventorySystem;
pub use telemetry::setup_tracing;
