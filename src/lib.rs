/// Agent Store
///
/// HTTP API that keeps agent configurations and call transcriptions as JSON
/// objects in a blob store bucket, with agent names held in object metadata.

pub mod api;
pub mod blob_store;
pub mod config;
pub mod context;
pub mod error;
pub mod metrics;
pub mod records;
pub mod server;

pub use config::ServerConfig;
pub use context::AppContext;
pub use error::{StoreError, StoreResult};
