/// Application context and dependency injection
use crate::{
    blob_store::BlobStore,
    config::ServerConfig,
    error::StoreResult,
    records::{IdGenerator, RecordRepository},
};
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub records: Arc<RecordRepository>,
    pub ids: Arc<IdGenerator>,
}

impl AppContext {
    /// Create a new application context from configuration
    ///
    /// The blob store client is created here once and shared by every request.
    pub async fn new(config: ServerConfig) -> StoreResult<Self> {
        // Validate configuration
        config.validate()?;

        let store = BlobStore::from_config(&config.storage).await?;
        Ok(Self::with_store(config, store, IdGenerator::new()))
    }

    /// Assemble a context around an already built store
    pub fn with_store(config: ServerConfig, store: BlobStore, ids: IdGenerator) -> Self {
        let records = RecordRepository::new(store, Arc::new(config.storage.clone()));

        Self {
            config: Arc::new(config),
            records: Arc::new(records),
            ids: Arc::new(ids),
        }
    }

    /// Address the server listens on
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.config.service.hostname, self.config.service.port)
    }
}
