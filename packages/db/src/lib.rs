//! SurrealDB integration for the job lifecycle.
//!
//! This crate provides database connectivity and the repository that
//! implements the `JobStore` port.
//!
//! # Features
//!
//! - `memory` (default): Use in-memory storage
//! - `rocksdb`: Use RocksDB for persistent file-based storage

mod connection;
mod schema;
pub mod repositories;

pub use connection::{Database, DbConfig, DbError, connect};
pub use repositories::JobRepository;
pub use schema::init_schema;

/// Connect with the given configuration and make sure the schema exists.
///
/// This should be called once at application startup.
pub async fn init(config: &DbConfig) -> Result<JobRepository, DbError> {
    let db = connect(config).await?;
    init_schema(&db).await?;
    Ok(JobRepository::new(db))
}
