//! Unit-of-work handler trait.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use job_core::Job;

/// Result type for job handlers.
pub type HandlerResult = Result<(), String>;

/// Future type for async job handlers.
pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;

/// Trait for the work performed when a job runs.
///
/// The job is already `running` when `handle` is called. An `Err` moves it
/// to `failed`.
pub trait JobHandler: Send + Sync + 'static {
    /// Process a job.
    fn handle(&self, job: &Job) -> HandlerFuture;
}

/// Placeholder work: waits for a fixed delay and succeeds.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedWork {
    delay: Duration,
}

impl SimulatedWork {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl JobHandler for SimulatedWork {
    fn handle(&self, job: &Job) -> HandlerFuture {
        let delay = self.delay;
        let job_id = job.id;
        Box::pin(async move {
            tracing::debug!(%job_id, ?delay, "simulating work");
            tokio::time::sleep(delay).await;
            Ok(())
        })
    }
}

/// A simple function-based job handler.
pub struct FnHandler<F>
where
    F: Fn(&Job) -> HandlerFuture + Send + Sync + 'static,
{
    handler: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&Job) -> HandlerFuture + Send + Sync + 'static,
{
    /// Create a new function-based handler.
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> JobHandler for FnHandler<F>
where
    F: Fn(&Job) -> HandlerFuture + Send + Sync + 'static,
{
    fn handle(&self, job: &Job) -> HandlerFuture {
        (self.handler)(job)
    }
}
