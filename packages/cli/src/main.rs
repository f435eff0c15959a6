//! Command-line front end for the job service.
//!
//! Reads `JOBS_DB_PATH` and `WEBHOOK_URL` from the environment. Without
//! `JOBS_DB_PATH` jobs only live for the duration of one command.

mod cli;

use std::error::Error;

use api::{CreateJobRequest, JobEvent, JobService, ListJobsQuery, ServiceConfig, init_job_service};
use clap::Parser;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = ServiceConfig::from_env();
    let notify = config.runner.webhook_url.is_some();
    let service = init_job_service(&config).await?;

    match cli.command {
        Command::Run {
            task,
            payload,
            priority,
        } => run(&service, notify, task, &payload, api::Priority::from(priority).as_str()).await,
        Command::List { status, priority } => {
            let jobs = service.list_jobs(ListJobsQuery { status, priority }).await?;
            print_json(&jobs)
        }
        Command::Get { id } => match service.get_job(&id).await? {
            Some(job) => print_json(&job),
            None => Err(format!("Job not found: {id}").into()),
        },
    }
}

async fn run(
    service: &JobService,
    notify: bool,
    task: String,
    payload: &str,
    priority: &str,
) -> Result<(), Box<dyn Error>> {
    let payload: Value = serde_json::from_str(payload)?;
    let job = service
        .create_job(CreateJobRequest::new(task, payload, priority))
        .await?;
    let id = job.id;

    // Subscribe before running so no event for this job is missed.
    let mut events = service.subscribe_events();
    let ack = service.run_job(&id.to_string()).await?;
    tracing::info!(job_id = %ack.job_id, "{}", ack.message);

    // The notification is the last step of a successful run; exiting earlier
    // would drop it with the runtime.
    loop {
        match events.recv().await {
            Ok(event) if event.job_id() == id => {
                tracing::debug!("{}", event.description());
                match event {
                    JobEvent::Failed { .. } => break,
                    JobEvent::Completed { .. } if !notify => break,
                    JobEvent::NotificationSent { .. } | JobEvent::NotificationFailed { .. } => {
                        break;
                    }
                    _ => {}
                }
            }
            Ok(_) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => break,
        }
    }

    match service.get_job(&id.to_string()).await? {
        Some(job) => print_json(&job),
        None => Err(format!("Job not found: {id}").into()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
