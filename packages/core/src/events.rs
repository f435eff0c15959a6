//! Lifecycle events published on the internal event channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Job, JobId, JobStatus};

/// Events emitted while jobs move through their lifecycle.
///
/// Failures that happen after a run was acknowledged are only observable
/// here, in the logs, or by re-reading the job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    /// A new job was created.
    Created { job: Job, timestamp: DateTime<Utc> },
    /// A status transition was applied.
    StatusChanged {
        job_id: JobId,
        old_status: JobStatus,
        new_status: JobStatus,
        timestamp: DateTime<Utc>,
    },
    /// A job's execution body finished successfully.
    Completed {
        job_id: JobId,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    /// A job's execution body failed after the run was acknowledged.
    Failed {
        job_id: JobId,
        error: String,
        timestamp: DateTime<Utc>,
    },
    /// The completion notification was accepted by the endpoint.
    NotificationSent {
        job_id: JobId,
        status_code: u16,
        timestamp: DateTime<Utc>,
    },
    /// The completion notification could not be delivered.
    NotificationFailed {
        job_id: JobId,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

impl JobEvent {
    /// Get the job ID associated with this event.
    pub fn job_id(&self) -> JobId {
        match self {
            JobEvent::Created { job, .. } => job.id,
            JobEvent::StatusChanged { job_id, .. } => *job_id,
            JobEvent::Completed { job_id, .. } => *job_id,
            JobEvent::Failed { job_id, .. } => *job_id,
            JobEvent::NotificationSent { job_id, .. } => *job_id,
            JobEvent::NotificationFailed { job_id, .. } => *job_id,
        }
    }

    /// Get a short description of this event for logging.
    pub fn description(&self) -> String {
        match self {
            JobEvent::Created { job, .. } => {
                format!("Job {} created ({})", job.id, job.task_name)
            }
            JobEvent::StatusChanged {
                job_id,
                old_status,
                new_status,
                ..
            } => format!("Job {} {} -> {}", job_id, old_status, new_status),
            JobEvent::Completed {
                job_id,
                duration_ms,
                ..
            } => format!("Job {} completed in {}ms", job_id, duration_ms),
            JobEvent::Failed { job_id, error, .. } => {
                format!("Job {} failed: {}", job_id, error)
            }
            JobEvent::NotificationSent {
                job_id,
                status_code,
                ..
            } => format!("Job {} notification sent ({})", job_id, status_code),
            JobEvent::NotificationFailed { job_id, error, .. } => {
                format!("Job {} notification failed: {}", job_id, error)
            }
        }
    }
}
