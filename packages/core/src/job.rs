//! Job domain types for tracked units of work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier for a job, assigned by the store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl JobId {
    /// Parse a job ID from a request token.
    ///
    /// Only plain decimal digits describing a positive integer are accepted.
    pub fn parse(s: &str) -> Result<Self, JobIdError> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(JobIdError(s.to_string()));
        }
        match s.parse::<u64>() {
            Ok(0) | Err(_) => Err(JobIdError(s.to_string())),
            Ok(id) => Ok(Self(id)),
        }
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = JobIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Rejected job ID token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid job ID: {0:?}")]
pub struct JobIdError(pub String);

/// Descriptive priority carried through to the completion notification.
///
/// Priority never reorders execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Parse the exact wire spelling (`Low`, `Medium`, `High`).
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current status of a job in its lifecycle.
///
/// `pending -> running -> completed | failed`, plus the re-run edge
/// `failed -> running`. `completed` is final.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job was created and has not been run.
    #[default]
    Pending,
    /// Job has been admitted and its execution body is in flight.
    Running,
    /// Job finished successfully.
    Completed,
    /// Job execution raised an error.
    Failed,
}

impl JobStatus {
    pub const ALL: [JobStatus; 4] = [
        JobStatus::Pending,
        JobStatus::Running,
        JobStatus::Completed,
        JobStatus::Failed,
    ];

    /// Check if the job's current run has ended.
    ///
    /// A `failed` job is terminal for its run but may be admitted again.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Check whether `self -> next` is an edge of the lifecycle graph.
    ///
    /// `failed -> running` is the re-run edge. Only run admission requests
    /// `running`, so it is applied nowhere else. Nothing leaves `completed`.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Failed, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }

    /// Get a simple status string for display.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Store-assigned identifier.
    pub id: JobId,
    /// Descriptive task name.
    pub task_name: String,
    /// Opaque structured payload, forwarded verbatim.
    pub payload: serde_json::Value,
    pub priority: Priority,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    /// Stamped on every status mutation.
    pub updated_at: DateTime<Utc>,
    /// Present exactly when `status` is `completed`.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Whether the `completed_at` stamp agrees with the status.
    pub fn is_consistent(&self) -> bool {
        self.completed_at.is_some() == (self.status == JobStatus::Completed)
    }
}

/// Validated input for creating a job.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub task_name: String,
    pub payload: serde_json::Value,
    pub priority: Priority,
}

impl NewJob {
    pub fn new(task_name: impl Into<String>, payload: serde_json::Value, priority: Priority) -> Self {
        Self {
            task_name: task_name.into(),
            payload,
            priority,
        }
    }
}

/// Status write applied by the lifecycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: JobStatus,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Filter options for listing jobs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub priority: Option<Priority>,
}

impl JobFilter {
    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn matches(&self, job: &Job) -> bool {
        self.status.is_none_or(|s| s == job.status)
            && self.priority.is_none_or(|p| p == job.priority)
    }
}
