//! Request surface over the store and the dispatcher.

use std::sync::Arc;

use job_core::{Job, JobEvent, JobStore};
use runner::{Dispatcher, JobHandler, Notifier, NotifyError, RunAck, RunnerConfig};
use tokio::sync::broadcast;

use crate::requests::{CreateJobRequest, ListJobsQuery, parse_job_id};
use crate::ApiError;

/// Capacity of the lifecycle event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// The four job operations plus an event feed.
///
/// Cheap to clone; clones share the store, the dispatcher and the event
/// channel.
#[derive(Clone)]
pub struct JobService {
    store: Arc<dyn JobStore>,
    dispatcher: Dispatcher,
    event_tx: broadcast::Sender<JobEvent>,
}

impl JobService {
    pub fn new(store: Arc<dyn JobStore>, handler: Arc<dyn JobHandler>, notifier: Notifier) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let dispatcher = Dispatcher::new(store.clone(), handler, notifier).with_event_tx(event_tx.clone());

        Self {
            store,
            dispatcher,
            event_tx,
        }
    }

    /// Build a service whose runs perform the simulated unit of work.
    pub fn from_config(store: Arc<dyn JobStore>, config: &RunnerConfig) -> Result<Self, NotifyError> {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let dispatcher = Dispatcher::from_config(store.clone(), config)?.with_event_tx(event_tx.clone());

        Ok(Self {
            store,
            dispatcher,
            event_tx,
        })
    }

    /// Validate and insert a new `pending` job.
    pub async fn create_job(&self, request: CreateJobRequest) -> Result<Job, ApiError> {
        let new_job = request.validate()?;
        let job = self.store.insert(new_job).await?;

        tracing::info!(job_id = %job.id, task_name = %job.task_name, priority = %job.priority, "job created");
        let _ = self.event_tx.send(JobEvent::Created {
            job: job.clone(),
            timestamp: job.created_at,
        });

        Ok(job)
    }

    /// List jobs, newest first.
    pub async fn list_jobs(&self, query: ListJobsQuery) -> Result<Vec<Job>, ApiError> {
        let filter = query.into_filter()?;
        let jobs = self.store.list(filter).await?;
        tracing::debug!(count = jobs.len(), ?filter, "listed jobs");
        Ok(jobs)
    }

    /// Fetch one job. `Ok(None)` when the id is well formed but unknown.
    pub async fn get_job(&self, id: &str) -> Result<Option<Job>, ApiError> {
        let id = parse_job_id(id)?;
        Ok(self.store.get(id).await?)
    }

    /// Start a job and return without waiting for it to finish.
    pub async fn run_job(&self, id: &str) -> Result<RunAck, ApiError> {
        let id = parse_job_id(id)?;
        let ack = self
            .dispatcher
            .request_run(id)
            .await
            .inspect_err(|err| tracing::warn!(job_id = %id, error = %err, "run rejected"))?;
        Ok(ack)
    }

    /// Receive lifecycle events published after this call.
    pub fn subscribe_events(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }
}
