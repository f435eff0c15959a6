//! Request shapes and input validation.

use job_core::{JobFilter, JobId, JobStatus, NewJob, Priority};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ApiError;

const MISSING_FIELDS: &str = "Missing required fields: taskName, payload, priority";
const BAD_PRIORITY: &str = "Priority must be Low, Medium, or High";
const BAD_PAYLOAD: &str = "Payload must be a valid JSON object";

/// Body of a create request. Every field is checked by [`validate`](Self::validate).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    #[serde(default)]
    pub task_name: Option<String>,
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(default)]
    pub priority: Option<String>,
}

impl CreateJobRequest {
    pub fn new(task_name: impl Into<String>, payload: Value, priority: impl Into<String>) -> Self {
        Self {
            task_name: Some(task_name.into()),
            payload: Some(payload),
            priority: Some(priority.into()),
        }
    }

    /// Parse a raw request body. Malformed JSON or wrongly typed fields are
    /// validation errors.
    pub fn from_json(body: &str) -> Result<Self, ApiError> {
        serde_json::from_str(body)
            .map_err(|e| ApiError::validation(format!("Invalid request body: {e}")))
    }

    /// Check all fields and build the job to insert.
    pub fn validate(self) -> Result<NewJob, ApiError> {
        let (Some(task_name), Some(payload), Some(priority)) =
            (self.task_name, self.payload, self.priority)
        else {
            return Err(ApiError::validation(MISSING_FIELDS));
        };

        if task_name.is_empty() || payload.is_null() || priority.is_empty() {
            return Err(ApiError::validation(MISSING_FIELDS));
        }

        let priority = Priority::parse(&priority).ok_or_else(|| ApiError::validation(BAD_PRIORITY))?;

        if !(payload.is_object() || payload.is_array()) {
            return Err(ApiError::validation(BAD_PAYLOAD));
        }

        Ok(NewJob::new(task_name, payload, priority))
    }
}

/// Optional list filters as they arrive from a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListJobsQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

impl ListJobsQuery {
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Empty values count as absent; unknown values are rejected.
    pub fn into_filter(self) -> Result<JobFilter, ApiError> {
        let mut filter = JobFilter::default();

        if let Some(status) = self.status.filter(|s| !s.is_empty()) {
            let status = JobStatus::parse(&status)
                .ok_or_else(|| ApiError::validation(format!("Unknown status: {status}")))?;
            filter = filter.with_status(status);
        }

        if let Some(priority) = self.priority.filter(|p| !p.is_empty()) {
            let priority = Priority::parse(&priority)
                .ok_or_else(|| ApiError::validation(format!("Unknown priority: {priority}")))?;
            filter = filter.with_priority(priority);
        }

        Ok(filter)
    }
}

/// Parse a job id token from a request path.
pub fn parse_job_id(token: &str) -> Result<JobId, ApiError> {
    JobId::parse(token).map_err(|_| ApiError::validation("Invalid job ID"))
}
