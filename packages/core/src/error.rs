//! Error taxonomy for the job lifecycle.

use thiserror::Error;

use crate::{JobId, JobStatus};

/// Errors raised by the lifecycle state machine, the dispatcher and the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("job not found: {0}")]
    NotFound(JobId),

    #[error("invalid transition from {current} to {requested}")]
    InvalidTransition {
        current: JobStatus,
        requested: JobStatus,
    },

    #[error("job {0} is already running")]
    AlreadyRunning(JobId),

    #[error("job {0} is already completed")]
    AlreadyCompleted(JobId),

    #[error("store error: {0}")]
    Store(String),
}

impl JobError {
    pub fn store(err: impl std::fmt::Display) -> Self {
        JobError::Store(err.to_string())
    }
}

pub type JobResult<T> = Result<T, JobError>;
