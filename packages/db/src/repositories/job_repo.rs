//! Job repository backed by SurrealDB.

use chrono::Utc;
use job_core::{Job, JobFilter, JobId, JobStatus, JobStore, NewJob, Priority, StatusUpdate, StoreFuture};
use serde::{Deserialize, Serialize};
use surrealdb::sql::{Datetime, Id, Thing};

use crate::{Database, DbError};

/// Repository for job persistence operations.
#[derive(Clone)]
pub struct JobRepository {
    db: Database,
}

/// Internal record type for SurrealDB reads.
#[derive(Debug, Deserialize)]
struct JobRecord {
    id: Thing,
    task_name: String,
    /// JSON text, parsed back on read.
    payload: String,
    priority: Priority,
    status: JobStatus,
    created_at: Datetime,
    updated_at: Datetime,
    #[serde(default)]
    completed_at: Option<Datetime>,
}

impl JobRecord {
    fn into_job(self) -> Result<Job, DbError> {
        let id = match self.id.id {
            Id::Number(n) if n > 0 => JobId(n as u64),
            other => {
                return Err(DbError::Serialization(format!(
                    "unexpected job record id: {}",
                    other
                )));
            }
        };

        let payload = serde_json::from_str(&self.payload).map_err(|e| {
            DbError::Serialization(format!("job {id} payload is not valid JSON: {e}"))
        })?;

        Ok(Job {
            id,
            task_name: self.task_name,
            payload,
            priority: self.priority,
            status: self.status,
            created_at: self.created_at.0,
            updated_at: self.updated_at.0,
            completed_at: self.completed_at.map(|d| d.0),
        })
    }
}

/// Struct for creating jobs - the record id is passed separately.
///
/// The payload is stored as JSON text; SurrealDB values would drop `null`
/// members and cannot hold integers above `i64::MAX`.
#[derive(Debug, Serialize)]
struct JobCreate {
    task_name: String,
    payload: String,
    priority: Priority,
    status: JobStatus,
    created_at: Datetime,
    updated_at: Datetime,
}

fn into_jobs(records: Vec<JobRecord>) -> Result<Vec<Job>, DbError> {
    records.into_iter().map(JobRecord::into_job).collect()
}

impl JobRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Allocate the next job id from the `sequence` table.
    async fn next_id(&self) -> Result<i64, DbError> {
        let mut response = self
            .db
            .query("UPSERT sequence:job SET next_id += 1 RETURN VALUE next_id")
            .await?;
        let ids: Vec<i64> = response.take(0)?;

        ids.into_iter()
            .next()
            .ok_or_else(|| DbError::Query("Failed to allocate job id".into()))
    }

    /// Create a new pending job in the database.
    pub async fn create(&self, new_job: NewJob) -> Result<Job, DbError> {
        let payload = serde_json::to_string(&new_job.payload)
            .map_err(|e| DbError::Serialization(e.to_string()))?;
        let id = self.next_id().await?;
        let now = Datetime::from(Utc::now());

        let content = JobCreate {
            task_name: new_job.task_name,
            payload,
            priority: new_job.priority,
            status: JobStatus::Pending,
            created_at: now.clone(),
            updated_at: now,
        };

        let record: Option<JobRecord> = self.db.create(("job", id)).content(content).await?;

        let job = record
            .ok_or_else(|| DbError::Query("Failed to create job".into()))?
            .into_job()?;
        tracing::debug!(job_id = %job.id, "inserted job");
        Ok(job)
    }

    /// Get a job by ID.
    pub async fn get(&self, id: JobId) -> Result<Option<Job>, DbError> {
        let record: Option<JobRecord> = self.db.select(("job", id.0 as i64)).await?;

        record.map(JobRecord::into_job).transpose()
    }

    /// List jobs with optional filtering, newest first.
    pub async fn list(&self, filter: JobFilter) -> Result<Vec<Job>, DbError> {
        let mut conditions = Vec::new();

        if filter.status.is_some() {
            conditions.push("status = $status");
        }

        if filter.priority.is_some() {
            conditions.push("priority = $priority");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT * FROM job {} ORDER BY created_at DESC, id DESC",
            where_clause
        );

        let mut result = self.db.query(&query);

        if let Some(status) = filter.status {
            result = result.bind(("status", status));
        }

        if let Some(priority) = filter.priority {
            result = result.bind(("priority", priority));
        }

        let mut response = result.await?;
        let records: Vec<JobRecord> = response.take(0)?;

        into_jobs(records)
    }

    /// Update a job's status if it is still `expected`.
    pub async fn update_status(
        &self,
        id: JobId,
        expected: JobStatus,
        update: StatusUpdate,
    ) -> Result<Option<Job>, DbError> {
        let mut response = self
            .db
            .query(
                r#"
                UPDATE type::thing('job', $id)
                SET status = $status,
                    updated_at = $updated_at,
                    completed_at = $completed_at
                WHERE status = $expected
                RETURN AFTER
                "#,
            )
            .bind(("id", id.0 as i64))
            .bind(("status", update.status))
            .bind(("updated_at", Datetime::from(update.updated_at)))
            .bind(("completed_at", update.completed_at.map(Datetime::from)))
            .bind(("expected", expected))
            .await?;

        let records: Vec<JobRecord> = response.take(0)?;

        records.into_iter().next().map(JobRecord::into_job).transpose()
    }
}

impl JobStore for JobRepository {
    fn insert(&self, job: NewJob) -> StoreFuture<'_, Job> {
        Box::pin(async move { Ok(self.create(job).await?) })
    }

    fn get(&self, id: JobId) -> StoreFuture<'_, Option<Job>> {
        Box::pin(async move { Ok(JobRepository::get(self, id).await?) })
    }

    fn list(&self, filter: JobFilter) -> StoreFuture<'_, Vec<Job>> {
        Box::pin(async move { Ok(JobRepository::list(self, filter).await?) })
    }

    fn set_status(
        &self,
        id: JobId,
        expected: JobStatus,
        update: StatusUpdate,
    ) -> StoreFuture<'_, Option<Job>> {
        Box::pin(async move { Ok(self.update_status(id, expected, update).await?) })
    }
}
