/// Configuration management for the agent store
use crate::{
    error::{StoreError, StoreResult},
    records::RecordKind,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
}

/// Storage configuration
///
/// The bucket is needed to build the long-lived store client and is checked
/// at startup. Directory prefixes and the document object name are checked
/// each time an operation needs them, so a deployment only has to provide the
/// values for the routes it actually serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub bucket_name: String,
    pub agents_path: Option<String>,
    pub transcriptions_directory: Option<String>,
    pub object_name: Option<String>,
    pub blobstore: BlobstoreConfig,
}

/// Blob storage backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BlobstoreConfig {
    Memory,
    Disk {
        location: PathBuf,
    },
    S3 {
        region: String,
        endpoint: Option<String>,
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
    },
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Read logging settings on their own, before the rest of the config
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG")
            .unwrap_or_else(|_| "agent_store=debug,tower_http=debug".to_string());
        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self { level, format }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Callers load `.env` first; see `main`.
    pub fn from_env() -> StoreResult<Self> {
        let hostname = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| StoreError::Configuration("Invalid port number".to_string()))?;

        let bucket_name = env::var("BUCKET_NAME")
            .map_err(|_| StoreError::Configuration("unable to find bucket name".to_string()))?;

        let blobstore = match env::var("BLOBSTORE_BACKEND")
            .unwrap_or_else(|_| "disk".to_string())
            .as_str()
        {
            "memory" => BlobstoreConfig::Memory,
            "disk" => BlobstoreConfig::Disk {
                location: env::var("BLOBSTORE_DISK_LOCATION")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./data/blobs")),
            },
            "s3" => BlobstoreConfig::S3 {
                region: env::var("BLOBSTORE_S3_REGION")
                    .unwrap_or_else(|_| "us-east-1".to_string()),
                endpoint: env::var("BLOBSTORE_S3_ENDPOINT").ok(),
                access_key_id: env::var("BLOBSTORE_S3_ACCESS_KEY_ID").ok(),
                secret_access_key: env::var("BLOBSTORE_S3_SECRET_ACCESS_KEY").ok(),
            },
            other => {
                return Err(StoreError::Configuration(format!(
                    "Unknown blob store backend: {}",
                    other
                )))
            }
        };

        Ok(ServerConfig {
            service: ServiceConfig { hostname, port },
            storage: StorageConfig {
                bucket_name,
                agents_path: env::var("GCP_STORAGE_AGENTS_PATH").ok(),
                transcriptions_directory: env::var("GCP_STORAGE_TRANSCRIPTIONS_DIRECTORY").ok(),
                object_name: env::var("OBJECT_NAME").ok(),
                blobstore,
            },
            logging: LoggingConfig::from_env(),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> StoreResult<()> {
        if self.service.hostname.is_empty() {
            return Err(StoreError::Configuration("Hostname cannot be empty".to_string()));
        }

        if self.service.port == 0 {
            return Err(StoreError::Configuration("Port cannot be zero".to_string()));
        }

        if self.storage.bucket_name.trim().is_empty() {
            return Err(StoreError::Configuration(
                "unable to find bucket name".to_string(),
            ));
        }

        Ok(())
    }
}

impl StorageConfig {
    /// Directory prefix for a record kind
    pub fn directory_for(&self, kind: RecordKind) -> StoreResult<&str> {
        let (value, message) = match kind {
            RecordKind::Agent => (&self.agents_path, "unable to find agents path"),
            RecordKind::Transcription => (
                &self.transcriptions_directory,
                "unable to find transcriptions directory",
            ),
        };

        non_empty(value).ok_or_else(|| StoreError::Configuration(message.to_string()))
    }

    /// Object written by the single-document endpoint
    pub fn object_name(&self) -> StoreResult<&str> {
        non_empty(&self.object_name)
            .ok_or_else(|| StoreError::Configuration("unable to find object name".to_string()))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
