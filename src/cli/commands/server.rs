use anyhow::Context;
use tokio::net::TcpListener;

use crate::app::app;
use crate::config::{AppConfig, StoreBackend};
use crate::database::DatabaseManager;
use crate::state::AppState;

/// Run the HTTP server until ctrl-c
pub async fn serve(mut config: AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting Farmwatch API in {:?} mode", config.environment);
    let store = DatabaseManager::connect(&config).await?;
    let bind_addr = config.bind_addr();
    let state = AppState::new(config, store);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Farmwatch API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Apply migrations and exit
pub async fn migrate(config: AppConfig) -> anyhow::Result<()> {
    if config.database.backend == StoreBackend::Memory {
        println!("STORE_BACKEND=memory has no schema to migrate");
        return Ok(());
    }
    let pool = DatabaseManager::pool(&config).await?;
    DatabaseManager::migrate(&pool).await?;
    println!("Migrations applied");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
