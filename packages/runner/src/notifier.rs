//! Best-effort completion notifications.
//!
//! A notification never raises, never retries and never touches job state.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use job_core::{Job, JobId, Priority};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Document POSTed to the endpoint when a job completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub job_id: JobId,
    pub task_name: String,
    pub priority: Priority,
    pub payload: serde_json::Value,
    /// ISO-8601 with millisecond precision, e.g. `2024-01-01T00:00:00.000Z`.
    pub completed_at: String,
}

impl NotificationPayload {
    pub fn new(job: &Job, completed_at: DateTime<Utc>) -> Self {
        Self {
            job_id: job.id,
            task_name: job.task_name.clone(),
            priority: job.priority,
            payload: job.payload.clone(),
            completed_at: completed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Notification errors. Logged and absorbed inside [`Notifier::notify`].
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid notification endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint responded with {0}")]
    Status(StatusCode),
}

/// What happened to a notification. Informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// No endpoint configured.
    Disabled,
    /// The endpoint answered with a 2xx status.
    Delivered { status: u16 },
    /// Timeout, connection error or non-2xx response.
    Failed { reason: String },
}

#[derive(Clone)]
struct Target {
    client: reqwest::Client,
    endpoint: Url,
}

impl Target {
    async fn send(&self, payload: &NotificationPayload) -> Result<StatusCode, NotifyError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status));
        }

        Ok(status)
    }
}

/// Sends completion notifications to the configured endpoint.
#[derive(Clone, Default)]
pub struct Notifier {
    target: Option<Target>,
}

impl Notifier {
    /// Build a notifier. `None` disables notifications.
    ///
    /// Fails only on a malformed endpoint or an HTTP client that cannot be
    /// built; delivery problems are never reported as errors.
    pub fn new(endpoint: Option<&str>, timeout: Duration) -> Result<Self, NotifyError> {
        let Some(url) = endpoint else {
            return Ok(Self::disabled());
        };

        let endpoint = Url::parse(url).map_err(|e| NotifyError::InvalidEndpoint {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            target: Some(Target { client, endpoint }),
        })
    }

    /// A notifier that never sends anything.
    pub fn disabled() -> Self {
        Self { target: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    /// Notify the endpoint that `job` completed at `completed_at`.
    pub async fn notify(&self, job: &Job, completed_at: DateTime<Utc>) -> NotifyOutcome {
        let Some(target) = &self.target else {
            tracing::warn!(
                job_id = %job.id,
                "WEBHOOK_URL not configured, skipping completion notification"
            );
            return NotifyOutcome::Disabled;
        };

        let payload = NotificationPayload::new(job, completed_at);

        tracing::info!(job_id = %job.id, endpoint = %target.endpoint, "sending completion notification");
        tracing::debug!(job_id = %job.id, ?payload, "notification payload");

        match target.send(&payload).await {
            Ok(status) => {
                tracing::info!(job_id = %job.id, %status, "completion notification delivered");
                NotifyOutcome::Delivered {
                    status: status.as_u16(),
                }
            }
            Err(err) => {
                match &err {
                    NotifyError::Status(status) => {
                        tracing::warn!(job_id = %job.id, %status, "completion notification rejected")
                    }
                    _ => tracing::error!(job_id = %job.id, error = %err, "completion notification failed"),
                }
                NotifyOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}
