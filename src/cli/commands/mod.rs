pub mod group;
pub mod server;
pub mod user;

use crate::config::{AppConfig, StoreBackend};
use crate::database::{DatabaseManager, Store};

/// Open the configured store for a one-shot admin command
pub(crate) async fn open_store(config: &AppConfig) -> anyhow::Result<Store> {
    if config.database.backend == StoreBackend::Memory {
        tracing::warn!("STORE_BACKEND=memory: changes made by this command are discarded on exit");
    }
    Ok(DatabaseManager::connect(config).await?)
}
