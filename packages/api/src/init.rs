//! Service configuration and startup.

use std::sync::Arc;

use db::DbConfig;
use runner::RunnerConfig;

use crate::JobService;

/// Environment variable selecting a RocksDB file store.
pub const DB_PATH_ENV: &str = "JOBS_DB_PATH";
/// Environment variable overriding the SurrealDB namespace.
pub const DB_NAMESPACE_ENV: &str = "JOBS_DB_NAMESPACE";
/// Environment variable overriding the SurrealDB database name.
pub const DB_DATABASE_ENV: &str = "JOBS_DB_DATABASE";

/// Everything needed to start a [`JobService`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    pub db: DbConfig,
    pub runner: RunnerConfig,
}

impl ServiceConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`.
    ///
    /// `JOBS_DB_PATH` selects a RocksDB store at that path (requires the
    /// `rocksdb` feature); otherwise jobs live in memory. `JOBS_DB_NAMESPACE`
    /// and `JOBS_DB_DATABASE` override the default `jobs`/`main` pair.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut db = match non_blank(DB_PATH_ENV) {
            Some(path) => DbConfig::rocksdb(path),
            None => DbConfig::memory(),
        };
        if let Some(namespace) = non_blank(DB_NAMESPACE_ENV) {
            db = db.with_namespace(namespace);
        }
        if let Some(database) = non_blank(DB_DATABASE_ENV) {
            db = db.with_database(database);
        }

        Self {
            db,
            runner: RunnerConfig::from_lookup(&lookup),
        }
    }

    pub fn with_db(mut self, db: DbConfig) -> Self {
        self.db = db;
        self
    }

    pub fn with_runner(mut self, runner: RunnerConfig) -> Self {
        self.runner = runner;
        self
    }
}

/// Connect the store and build the service.
///
/// This should be called once at startup before handling requests.
pub async fn init_job_service(config: &ServiceConfig) -> Result<JobService, Box<dyn std::error::Error>> {
    tracing::info!("Initializing job service...");

    let repo = db::init(&config.db).await?;
    let service = JobService::from_config(Arc::new(repo), &config.runner)?;

    match &config.runner.webhook_url {
        Some(url) => tracing::info!(endpoint = %url, "completion webhook configured"),
        None => tracing::warn!("WEBHOOK_URL not set, completion notifications disabled"),
    }

    tracing::info!(
        processing_delay_ms = config.runner.processing_delay.as_millis() as u64,
        "Job service initialized"
    );
    Ok(service)
}
