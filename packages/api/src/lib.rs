//! Request surface for the job lifecycle service.
//!
//! This crate maps the four job operations onto the store and the
//! dispatcher:
//! - Create (validate, insert as `pending`)
//! - List (optional status/priority filters, newest first)
//! - Get by id
//! - Run (admit and return immediately)
//!
//! It is transport independent; an HTTP layer maps [`ApiError::kind`] to
//! status codes.

mod error;
mod init;
mod requests;
mod service;

pub use error::ApiError;
pub use init::{DB_DATABASE_ENV, DB_NAMESPACE_ENV, DB_PATH_ENV, ServiceConfig, init_job_service};
pub use requests::{CreateJobRequest, ListJobsQuery, parse_job_id};
pub use service::{EVENT_CHANNEL_CAPACITY, JobService};

// Re-export core types for convenience
pub use job_core::{Job, JobEvent, JobId, JobStatus, Priority};
pub use runner::{RunAck, RunnerConfig};
