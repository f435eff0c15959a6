//! Execution dispatcher.
//!
//! `request_run` moves a job to `running` before it spawns the execution
//! body, so a second request for the same job always sees `running`. That
//! transition is the only admission control.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use job_core::{Job, JobError, JobEvent, JobId, JobResult, JobStatus, JobStore, Lifecycle};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::Instrument;

use crate::config::RunnerConfig;
use crate::handler::{JobHandler, SimulatedWork};
use crate::notifier::{Notifier, NotifyError, NotifyOutcome};

/// Immediate acknowledgment of an accepted run request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAck {
    pub message: String,
    pub job_id: JobId,
    pub status: JobStatus,
}

impl RunAck {
    fn started(job_id: JobId) -> Self {
        Self {
            message: "Job started successfully".to_string(),
            job_id,
            status: JobStatus::Running,
        }
    }
}

/// Failure inside the execution body, after the run was acknowledged.
#[derive(Debug, Error)]
enum ExecutionError {
    #[error("handler error: {0}")]
    Handler(String),

    #[error(transparent)]
    Lifecycle(#[from] JobError),
}

/// Starts job executions without blocking the caller.
#[derive(Clone)]
pub struct Dispatcher {
    lifecycle: Lifecycle,
    handler: Arc<dyn JobHandler>,
    notifier: Notifier,
    event_tx: Option<broadcast::Sender<JobEvent>>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn JobStore>, handler: Arc<dyn JobHandler>, notifier: Notifier) -> Self {
        Self {
            lifecycle: Lifecycle::new(store),
            handler,
            notifier,
            event_tx: None,
        }
    }

    /// Build a dispatcher running [`SimulatedWork`] with the configured delay.
    ///
    /// A malformed webhook URL disables notifications instead of failing.
    pub fn from_config(store: Arc<dyn JobStore>, config: &RunnerConfig) -> Result<Self, NotifyError> {
        let notifier = match Notifier::new(config.webhook_url.as_deref(), config.notify_timeout) {
            Ok(notifier) => notifier,
            Err(err @ NotifyError::InvalidEndpoint { .. }) => {
                tracing::warn!(error = %err, "completion notifications disabled");
                Notifier::disabled()
            }
            Err(err) => return Err(err),
        };
        let handler = Arc::new(SimulatedWork::new(config.processing_delay));
        Ok(Self::new(store, handler, notifier))
    }

    /// Publish lifecycle and execution events on `tx`.
    pub fn with_event_tx(mut self, tx: broadcast::Sender<JobEvent>) -> Self {
        self.lifecycle = self.lifecycle.with_event_tx(tx.clone());
        self.event_tx = Some(tx);
        self
    }

    /// Admit job `id` for execution and return immediately.
    ///
    /// The caller learns nothing about the eventual outcome; re-read the job
    /// to observe it.
    pub async fn request_run(&self, id: JobId) -> JobResult<RunAck> {
        let job = self
            .lifecycle
            .store()
            .get(id)
            .await?
            .ok_or(JobError::NotFound(id))?;

        match job.status {
            JobStatus::Running => return Err(JobError::AlreadyRunning(id)),
            JobStatus::Completed => return Err(JobError::AlreadyCompleted(id)),
            JobStatus::Pending | JobStatus::Failed => {}
        }

        let running = self
            .lifecycle
            .transition(id, JobStatus::Running)
            .await
            .map_err(|err| admission_error(id, err))?;

        tracing::info!(job_id = %id, task_name = %running.task_name, "starting job");

        let this = self.clone();
        tokio::spawn(
            async move { this.execute(running).await }
                .instrument(tracing::info_span!("job", job_id = %id)),
        );

        Ok(RunAck::started(id))
    }

    async fn execute(&self, job: Job) {
        let id = job.id;
        let started = Instant::now();

        match self.run_to_completion(&job).await {
            Ok(completed) => {
                let completed_at = completed.completed_at.unwrap_or(completed.updated_at);
                let duration_ms = started.elapsed().as_millis() as u64;
                tracing::info!(job_id = %id, duration_ms, "job completed");
                self.publish(JobEvent::Completed {
                    job_id: id,
                    duration_ms,
                    timestamp: completed_at,
                });

                let outcome = self.notifier.notify(&completed, completed_at).await;
                self.publish_notification(id, outcome);
            }
            Err(err) => self.fail(id, err).await,
        }
    }

    async fn run_to_completion(&self, job: &Job) -> Result<Job, ExecutionError> {
        self.handler
            .handle(job)
            .await
            .map_err(ExecutionError::Handler)?;

        Ok(self.lifecycle.transition(job.id, JobStatus::Completed).await?)
    }

    async fn fail(&self, id: JobId, err: ExecutionError) {
        tracing::error!(job_id = %id, error = %err, "job failed");

        if let Err(mark_err) = self.lifecycle.transition(id, JobStatus::Failed).await {
            tracing::error!(job_id = %id, error = %mark_err, "could not mark job as failed");
        }

        self.publish(JobEvent::Failed {
            job_id: id,
            error: err.to_string(),
            timestamp: Utc::now(),
        });
    }

    fn publish_notification(&self, job_id: JobId, outcome: NotifyOutcome) {
        let timestamp = Utc::now();
        match outcome {
            NotifyOutcome::Disabled => {}
            NotifyOutcome::Delivered { status } => self.publish(JobEvent::NotificationSent {
                job_id,
                status_code: status,
                timestamp,
            }),
            NotifyOutcome::Failed { reason } => self.publish(JobEvent::NotificationFailed {
                job_id,
                error: reason,
                timestamp,
            }),
        }
    }

    fn publish(&self, event: JobEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }
}

/// A lost race on the `running` transition means another request got there
/// first; report it the same way as the up-front status check.
fn admission_error(id: JobId, err: JobError) -> JobError {
    match err {
        JobError::InvalidTransition {
            current: JobStatus::Running,
            ..
        } => JobError::AlreadyRunning(id),
        JobError::InvalidTransition {
            current: JobStatus::Completed,
            ..
        } => JobError::AlreadyCompleted(id),
        other => other,
    }
}
