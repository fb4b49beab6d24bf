use inventory::api::{self, AppState};
use inventory::config::InventoryConfig;
use inventory::lifecycle::{setup_tracing, InventorySystem};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = InventoryConfig::load().map_err(|e| e.to_string())?;
    let system = InventorySystem::start(&config)
        .await
        .map_err(|e| e.to_string())?;

    let app = api::router(AppState::from_system(&system));
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", config.listen_addr, e))?;
    info!(addr = %config.listen_addr, "Listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = &served {
        error!(error = %e, "Server error");
    }

    system.shutdown().await?;
    served.map_err(|e| e.to_string())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Keep serving; the process can still be killed.
        error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Ctrl-C received, stopping server");
}
