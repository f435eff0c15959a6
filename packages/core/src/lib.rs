//! Core domain types for the job lifecycle.
//!
//! This crate contains the pieces shared by every package:
//! - Job, JobStatus and Priority
//! - The lifecycle state machine and the store port it writes through
//! - Lifecycle events and the error taxonomy

mod error;
mod events;
mod job;
pub mod lifecycle;
mod store;

pub use error::{JobError, JobResult};
pub use events::JobEvent;
pub use job::{Job, JobFilter, JobId, JobIdError, JobStatus, NewJob, Priority, StatusUpdate};
pub use lifecycle::Lifecycle;
pub use store::{JobStore, StoreFuture};
