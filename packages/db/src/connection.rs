//! Database connection management.

use std::path::PathBuf;

use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect as connect_any};
use thiserror::Error;

use job_core::JobError;

/// Database connection handle. Cheap to clone.
pub type Database = Surreal<Any>;

/// Where job records are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    /// Private in-memory datastore, gone when the handle is dropped.
    Memory,
    /// RocksDB directory (requires the `rocksdb` feature).
    RocksDb(PathBuf),
}

/// Database configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub storage: Storage,
    pub namespace: String,
    pub database: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            storage: Storage::Memory,
            namespace: "jobs".to_string(),
            database: "main".to_string(),
        }
    }
}

impl DbConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn rocksdb(path: impl Into<PathBuf>) -> Self {
        Self {
            storage: Storage::RocksDb(path.into()),
            ..Default::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Engine address understood by `surrealdb::engine::any`.
    pub fn endpoint(&self) -> String {
        match &self.storage {
            Storage::Memory => "mem://".to_string(),
            Storage::RocksDb(path) => format!("rocksdb://{}", path.display()),
        }
    }
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Connection error: {0}")]
    Connection(#[from] surrealdb::Error),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<DbError> for JobError {
    fn from(err: DbError) -> Self {
        JobError::store(err)
    }
}

/// Open a datastore and select the configured namespace and database.
///
/// Every `Storage::Memory` connection gets its own datastore.
pub async fn connect(config: &DbConfig) -> Result<Database, DbError> {
    let endpoint = config.endpoint();
    tracing::info!(%endpoint, "opening job store");

    let db = connect_any(endpoint.as_str()).await?;
    db.use_ns(&config.namespace).use_db(&config.database).await?;

    tracing::info!(namespace = %config.namespace, database = %config.database, "job store ready");

    Ok(db)
}
