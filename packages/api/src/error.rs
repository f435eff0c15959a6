//! Caller-facing errors.

use job_core::JobError;
use thiserror::Error;

/// Errors returned by [`JobService`](crate::JobService).
///
/// The message is safe to show to the caller. [`ApiError::kind`] gives a
/// stable tag a transport layer can map to its own status codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal(_) => "internal",
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::NotFound(_) => ApiError::NotFound("Job not found".to_string()),
            JobError::AlreadyRunning(_) => ApiError::Conflict("Job is already running".to_string()),
            JobError::AlreadyCompleted(_) => {
                ApiError::Conflict("Job is already completed".to_string())
            }
            err @ JobError::InvalidTransition { .. } => ApiError::Conflict(err.to_string()),
            JobError::Store(message) => {
                tracing::error!(error = %message, "store failure");
                ApiError::Internal(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use job_core::{JobId, JobStatus};

    #[test]
    fn job_errors_map_to_caller_kinds() {
        let cases = [
            (JobError::NotFound(JobId(1)), "not_found"),
            (JobError::AlreadyRunning(JobId(1)), "conflict"),
            (JobError::AlreadyCompleted(JobId(1)), "conflict"),
            (
                JobError::InvalidTransition {
                    current: JobStatus::Pending,
                    requested: JobStatus::Completed,
                },
                "conflict",
            ),
            (JobError::Store("disk".into()), "internal"),
        ];

        for (err, kind) in cases {
            assert_eq!(ApiError::from(err).kind(), kind);
        }
    }

    #[test]
    fn admission_messages_are_distinct() {
        assert_eq!(
            ApiError::from(JobError::AlreadyRunning(JobId(4))).to_string(),
            "Job is already running"
        );
        assert_eq!(
            ApiError::from(JobError::AlreadyCompleted(JobId(4))).to_string(),
            "Job is already completed"
        );
    }
}
