//! Job store port.
//!
//! The store is the only source of truth for job state. Nothing in the
//! lifecycle layer caches a job between calls.

use std::future::Future;
use std::pin::Pin;

use crate::{Job, JobFilter, JobId, JobResult, JobStatus, NewJob, StatusUpdate};

/// Future type returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = JobResult<T>> + Send + 'a>>;

/// Persistence contract for job records.
///
/// Implementations must be shareable across spawned tasks.
pub trait JobStore: Send + Sync + 'static {
    /// Insert a new `pending` job and return it as stored.
    fn insert(&self, job: NewJob) -> StoreFuture<'_, Job>;

    /// Fetch a job by ID.
    fn get(&self, id: JobId) -> StoreFuture<'_, Option<Job>>;

    /// List jobs matching `filter`, newest-created first.
    fn list(&self, filter: JobFilter) -> StoreFuture<'_, Vec<Job>>;

    /// Write a status change if the record still has status `expected`.
    ///
    /// Returns `None` when the job is missing or its status has moved on.
    fn set_status(
        &self,
        id: JobId,
        expected: JobStatus,
        update: StatusUpdate,
    ) -> StoreFuture<'_, Option<Job>>;
}
