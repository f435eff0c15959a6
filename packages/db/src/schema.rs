//! Database schema definitions using SurrealQL.

use crate::{Database, DbError};

/// Initialize the database schema.
///
/// This creates all necessary tables, fields, and indexes.
pub async fn init_schema(db: &Database) -> Result<(), DbError> {
    tracing::info!("Initializing database schema...");

    db.query(SEQUENCE_SCHEMA).await?.check()?;
    db.query(JOB_SCHEMA).await?.check()?;

    tracing::info!("Database schema initialized");

    Ok(())
}

/// Id sequence table schema.
const SEQUENCE_SCHEMA: &str = r#"
-- One row per table that allocates integer ids
DEFINE TABLE IF NOT EXISTS sequence SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS next_id ON sequence TYPE int DEFAULT 0;
"#;

/// Job table schema.
const JOB_SCHEMA: &str = r#"
-- Job table, record ids are job:<integer>. The payload is kept as JSON text
-- so it reads back exactly as written.
DEFINE TABLE IF NOT EXISTS job SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS task_name ON job TYPE string ASSERT string::len($value) > 0;
DEFINE FIELD IF NOT EXISTS payload ON job TYPE string;
DEFINE FIELD IF NOT EXISTS priority ON job TYPE string ASSERT $value IN ["Low", "Medium", "High"];
DEFINE FIELD IF NOT EXISTS status ON job TYPE string DEFAULT "pending"
    ASSERT $value IN ["pending", "running", "completed", "failed"];
DEFINE FIELD IF NOT EXISTS created_at ON job TYPE datetime DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS updated_at ON job TYPE datetime DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS completed_at ON job TYPE option<datetime>;

-- Indexes for the list filters and ordering
DEFINE INDEX IF NOT EXISTS job_status ON job FIELDS status;
DEFINE INDEX IF NOT EXISTS job_priority ON job FIELDS priority;
DEFINE INDEX IF NOT EXISTS job_created ON job FIELDS created_at;
"#;
