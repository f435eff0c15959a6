//! Job execution for the lifecycle service.
//!
//! # Architecture
//!
//! - `Dispatcher` - admits run requests and spawns one execution body per run
//! - `JobHandler` - the unit of work a run performs (`SimulatedWork` by default)
//! - `Notifier` - best-effort completion notification over HTTP
//!
//! # Usage
//!
//! ```ignore
//! use runner::{Dispatcher, RunnerConfig};
//!
//! let dispatcher = Dispatcher::from_config(store, &RunnerConfig::from_env())?;
//! let ack = dispatcher.request_run(job_id).await?;
//! ```

mod config;
mod dispatcher;
mod handler;
mod notifier;

pub use config::{
    DEFAULT_NOTIFY_TIMEOUT, DEFAULT_PROCESSING_DELAY, RunnerConfig, WEBHOOK_URL_ENV,
};
pub use dispatcher::{Dispatcher, RunAck};
pub use handler::{FnHandler, HandlerFuture, HandlerResult, JobHandler, SimulatedWork};
pub use notifier::{NotificationPayload, Notifier, NotifyError, NotifyOutcome};
