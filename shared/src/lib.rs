pub mod types;
pub mod error;
pub mod config;
pub mod http;
pub mod store;
pub mod password;
pub mod session;
pub mod auth;
pub mod organizations;
pub mod admins;
pub mod students;
pub mod analytics;

use config::{Config, StoreBackend};
use session::SessionSigner;
use std::sync::Arc;
use store::{DynamoStore, MemoryStore, TableStore};

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn TableStore>,
    pub sessions: SessionSigner,
}

impl AppState {
    pub fn new(store: Arc<dyn TableStore>, sessions: SessionSigner) -> Arc<Self> {
        Arc::new(Self { store, sessions })
    }

    /// Build the state a deployment runs with: the configured store and a
    /// signer keyed by `JWT_SECRET`.
    pub async fn from_config(config: &Config) -> Arc<Self> {
        let store: Arc<dyn TableStore> = match config.store_backend {
            StoreBackend::Dynamo => Arc::new(DynamoStore::from_env(config.table_prefix.clone()).await),
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; data will not persist");
                Arc::new(MemoryStore::new())
            }
        };
        Self::new(store, SessionSigner::new(&config.jwt_secret))
    }
}
