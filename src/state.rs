use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::auth::{hash_password, PasswordError, TokenService};
use crate::config::AppConfig;
use crate::database::Store;

/// Shared per-process state handed to every handler
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Store,
    pub tokens: TokenService,
    dummy_hash: Arc<OnceCell<String>>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Store) -> Self {
        let tokens = TokenService::from_config(&config.security);
        Self {
            config: Arc::new(config),
            store,
            tokens,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Hash checked against when a login names an unknown email, so both
    /// failure paths cost one bcrypt verification
    pub async fn dummy_hash(&self) -> Result<&str, PasswordError> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash.as_str());
        }
        let hash = hash_password("farmwatch-dummy-password", self.config.security.bcrypt_cost).await?;
        Ok(self.dummy_hash.get_or_init(|| hash).as_str())
    }
}
