pub mod config;
pub mod navigation;
pub mod session;

use anyhow::Result;
use std::sync::Arc;
use stl_client::access::AccessController;
use stl_client::api;
use stl_client::config::ClientConfig;
use stl_client::session::{FileTokenStore, SessionManager};

pub struct CommandContext {
    pub config: ClientConfig,
    pub session: SessionManager,
    pub access: AccessController,
}

impl CommandContext {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let store = Arc::new(FileTokenStore::in_dir(&config.data_dir));
        let client = api::connect(&config, store.clone());
        let session = SessionManager::new(client, store).with_request_timeout(config.api.request_timeout());
        let access = AccessController::with_fallback(config.access.fallback_policy())?;
        Ok(Self { config, session, access })
    }

    /// Restore the persisted session before answering questions about it
    pub async fn restore(&self) {
        self.session.bootstrap().await;
    }
}
