#![allow(dead_code)]

use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api::{Job, JobService, RunnerConfig, ServiceConfig, init_job_service};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

pub const PROCESSING_DELAY: Duration = Duration::from_millis(200);

/// In-memory service with a short processing delay.
pub async fn setup_service(webhook_url: Option<String>) -> Result<JobService, Box<dyn Error>> {
    let mut runner = RunnerConfig::default()
        .with_processing_delay(PROCESSING_DELAY)
        .with_notify_timeout(Duration::from_secs(1));
    runner.webhook_url = webhook_url;

    init_job_service(&ServiceConfig::default().with_runner(runner)).await
}

/// Bodies posted to the local webhook receiver.
pub type Captured = Arc<Mutex<Vec<Value>>>;

async fn capture(State(captured): State<Captured>, Json(body): Json<Value>) {
    captured.lock().unwrap().push(body);
}

/// Spawn a webhook receiver; `None` when local sockets are not permitted.
pub async fn spawn_webhook() -> Result<Option<(String, Captured)>, Box<dyn Error>> {
    let captured = Captured::default();
    let app = Router::new()
        .route("/hook", post(capture))
        .with_state(captured.clone());

    let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
            eprintln!("skipping webhook test: local socket bind is not permitted");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(Some((format!("http://{addr}/hook"), captured)))
}

/// Poll `get_job` until the job is terminal.
pub async fn wait_until_terminal(service: &JobService, id: &str) -> Option<Job> {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match service.get_job(id).await {
                Ok(Some(job)) if job.status.is_terminal() => return Some(job),
                Ok(Some(_)) => tokio::time::sleep(Duration::from_millis(20)).await,
                _ => return None,
            }
        }
    })
    .await
    .ok()
    .flatten()
}
