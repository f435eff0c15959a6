use db::{DbConfig, DbError, JobRepository};

/// Fresh in-memory repository; every `mem://` connection is isolated.
pub async fn setup_repo() -> Result<JobRepository, DbError> {
    db::init(&DbConfig::memory()).await
}
