//! Lifecycle state machine.
//!
//! Validates and applies status transitions against the store. This is the
//! only place that stamps `updated_at` and `completed_at`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::{Job, JobError, JobEvent, JobId, JobResult, JobStatus, JobStore, StatusUpdate};

/// Reject any edge outside `pending -> running -> completed | failed`.
pub fn check_transition(current: JobStatus, requested: JobStatus) -> JobResult<()> {
    if current.can_transition_to(requested) {
        Ok(())
    } else {
        Err(JobError::InvalidTransition { current, requested })
    }
}

/// Build the store write for entering `status` at instant `at`.
pub fn stamp(status: JobStatus, at: DateTime<Utc>) -> StatusUpdate {
    StatusUpdate {
        status,
        updated_at: at,
        completed_at: (status == JobStatus::Completed).then_some(at),
    }
}

/// Applies validated transitions to jobs in a [`JobStore`].
#[derive(Clone)]
pub struct Lifecycle {
    store: Arc<dyn JobStore>,
    event_tx: Option<broadcast::Sender<JobEvent>>,
}

impl Lifecycle {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            event_tx: None,
        }
    }

    /// Publish applied transitions on `tx`.
    pub fn with_event_tx(mut self, tx: broadcast::Sender<JobEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Move job `id` to `to`, returning the job as stored afterwards.
    pub async fn transition(&self, id: JobId, to: JobStatus) -> JobResult<Job> {
        let job = self.store.get(id).await?.ok_or(JobError::NotFound(id))?;
        let from = job.status;
        check_transition(from, to)?;

        let update = stamp(to, Utc::now());
        let Some(updated) = self.store.set_status(id, from, update).await? else {
            // Lost a race with another writer; report what is there now.
            let current = self
                .store
                .get(id)
                .await?
                .ok_or(JobError::NotFound(id))?
                .status;
            return Err(JobError::InvalidTransition {
                current,
                requested: to,
            });
        };

        tracing::debug!(job_id = %id, %from, %to, "applied status transition");

        if let Some(tx) = &self.event_tx {
            let _ = tx.send(JobEvent::StatusChanged {
                job_id: id,
                old_status: from,
                new_status: to,
                timestamp: update.updated_at,
            });
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::{JobFilter, NewJob, Priority, StoreFuture};

    /// Minimal map-backed store for exercising the state machine.
    #[derive(Default)]
    struct MapStore {
        jobs: Mutex<BTreeMap<JobId, Job>>,
    }

    impl MapStore {
        fn force_status(&self, id: JobId, status: JobStatus) {
            if let Some(job) = self.jobs.lock().unwrap().get_mut(&id) {
                job.status = status;
            }
        }
    }

    impl JobStore for MapStore {
        fn insert(&self, job: NewJob) -> StoreFuture<'_, Job> {
            Box::pin(async move {
                let mut jobs = self.jobs.lock().unwrap();
                let id = JobId(jobs.len() as u64 + 1);
                let now = Utc::now();
                let job = Job {
                    id,
                    task_name: job.task_name,
                    payload: job.payload,
                    priority: job.priority,
                    status: JobStatus::Pending,
                    created_at: now,
                    updated_at: now,
                    completed_at: None,
                };
                jobs.insert(id, job.clone());
                Ok(job)
            })
        }

        fn get(&self, id: JobId) -> StoreFuture<'_, Option<Job>> {
            Box::pin(async move { Ok(self.jobs.lock().unwrap().get(&id).cloned()) })
        }

        fn list(&self, filter: JobFilter) -> StoreFuture<'_, Vec<Job>> {
            Box::pin(async move {
                let jobs = self.jobs.lock().unwrap();
                Ok(jobs.values().rev().filter(|j| filter.matches(j)).cloned().collect())
            })
        }

        fn set_status(
            &self,
            id: JobId,
            expected: JobStatus,
            update: StatusUpdate,
        ) -> StoreFuture<'_, Option<Job>> {
            Box::pin(async move {
                let mut jobs = self.jobs.lock().unwrap();
                Ok(jobs.get_mut(&id).filter(|j| j.status == expected).map(|job| {
                    job.status = update.status;
                    job.updated_at = update.updated_at;
                    job.completed_at = update.completed_at;
                    job.clone()
                }))
            })
        }
    }

    async fn setup() -> (Arc<MapStore>, Lifecycle, Job) {
        let store = Arc::new(MapStore::default());
        let job = store
            .insert(NewJob::new("task", json!({"k": 1}), Priority::Low))
            .await
            .unwrap();
        let lifecycle = Lifecycle::new(store.clone());
        (store, lifecycle, job)
    }

    #[test]
    fn stamp_sets_completed_at_only_on_completion() {
        let now = Utc::now();
        assert_eq!(stamp(JobStatus::Completed, now).completed_at, Some(now));
        for status in [JobStatus::Running, JobStatus::Failed, JobStatus::Pending] {
            let update = stamp(status, now);
            assert_eq!(update.completed_at, None);
            assert_eq!(update.updated_at, now);
        }
    }

    #[tokio::test]
    async fn walks_the_happy_path() {
        let (_store, lifecycle, job) = setup().await;

        let running = lifecycle.transition(job.id, JobStatus::Running).await.unwrap();
        assert_eq!(running.status, JobStatus::Running);
        assert!(running.completed_at.is_none());
        assert!(running.updated_at >= job.updated_at);

        let completed = lifecycle.transition(job.id, JobStatus::Completed).await.unwrap();
        assert_eq!(completed.status, JobStatus::Completed);
        assert_eq!(completed.completed_at, Some(completed.updated_at));
        assert!(completed.is_consistent());
    }

    #[tokio::test]
    async fn rejects_edges_outside_the_graph() {
        let (_store, lifecycle, job) = setup().await;

        let err = lifecycle
            .transition(job.id, JobStatus::Completed)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            JobError::InvalidTransition {
                current: JobStatus::Pending,
                requested: JobStatus::Completed,
            }
        );

        lifecycle.transition(job.id, JobStatus::Running).await.unwrap();
        lifecycle.transition(job.id, JobStatus::Completed).await.unwrap();

        let err = lifecycle
            .transition(job.id, JobStatus::Running)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            JobError::InvalidTransition {
                current: JobStatus::Completed,
                requested: JobStatus::Running,
            }
        );
    }

    #[tokio::test]
    async fn failed_job_can_run_again() {
        let (_store, lifecycle, job) = setup().await;

        lifecycle.transition(job.id, JobStatus::Running).await.unwrap();
        lifecycle.transition(job.id, JobStatus::Failed).await.unwrap();

        let err = lifecycle
            .transition(job.id, JobStatus::Completed)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            JobError::InvalidTransition {
                current: JobStatus::Failed,
                requested: JobStatus::Completed,
            }
        );

        let rerun = lifecycle.transition(job.id, JobStatus::Running).await.unwrap();
        assert_eq!(rerun.status, JobStatus::Running);
        assert!(rerun.completed_at.is_none());

        let done = lifecycle.transition(job.id, JobStatus::Completed).await.unwrap();
        assert!(done.is_consistent());
    }

    #[tokio::test]
    async fn missing_job_is_not_found() {
        let (_store, lifecycle, _job) = setup().await;
        let err = lifecycle
            .transition(JobId(99), JobStatus::Running)
            .await
            .unwrap_err();
        assert_eq!(err, JobError::NotFound(JobId(99)));
    }

    #[tokio::test]
    async fn publishes_status_changes() {
        let (_store, lifecycle, job) = setup().await;
        let (tx, mut rx) = broadcast::channel(8);
        let lifecycle = lifecycle.with_event_tx(tx);

        lifecycle.transition(job.id, JobStatus::Running).await.unwrap();

        match rx.recv().await.unwrap() {
            JobEvent::StatusChanged {
                job_id,
                old_status,
                new_status,
                ..
            } => {
                assert_eq!(job_id, job.id);
                assert_eq!(old_status, JobStatus::Pending);
                assert_eq!(new_status, JobStatus::Running);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn guarded_write_refuses_stale_expectation() {
        let (store, _lifecycle, job) = setup().await;
        store.force_status(job.id, JobStatus::Running);

        let write = store
            .set_status(job.id, JobStatus::Pending, stamp(JobStatus::Running, Utc::now()))
            .await
            .unwrap();
        assert!(write.is_none());
    }
}
