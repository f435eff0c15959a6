#![allow(dead_code)]

use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use axum::{Json, Router};
use db::{DbConfig, JobRepository};
use job_core::{Job, JobEvent, JobId, JobStatus, JobStore};
use serde_json::Value;
use tokio::sync::broadcast;

/// Requests captured by the local webhook receiver.
#[derive(Clone, Default)]
pub struct Received {
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

impl Received {
    pub fn bodies(&self) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, body)| body.clone())
            .collect()
    }

    pub fn content_types(&self) -> Vec<Option<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(content_type, _)| content_type.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[derive(Clone)]
struct ReceiverState {
    received: Received,
    status: StatusCode,
    delay: Duration,
}

async fn receive(
    State(state): State<ReceiverState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state
        .received
        .requests
        .lock()
        .unwrap()
        .push((content_type, body));
    tokio::time::sleep(state.delay).await;
    state.status
}

/// Spawn a webhook receiver on an ephemeral port.
///
/// Returns `None` when the sandbox does not allow binding local sockets.
pub async fn spawn_webhook(
    status: StatusCode,
    delay: Duration,
) -> Result<Option<(String, Received)>, Box<dyn Error>> {
    let received = Received::default();
    let state = ReceiverState {
        received: received.clone(),
        status,
        delay,
    };
    let app = Router::new()
        .route("/hook", post(receive))
        .with_state(state);

    let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
            eprintln!("skipping webhook tests: local socket bind is not permitted");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(Some((format!("http://{addr}/hook"), received)))
}

/// An endpoint on a port nobody listens on.
pub async fn unreachable_endpoint() -> Result<String, Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}/hook"))
}

pub async fn setup_store() -> Result<Arc<JobRepository>, Box<dyn Error>> {
    Ok(Arc::new(db::init(&DbConfig::memory()).await?))
}

/// Wait for the first event matching `pred`.
pub async fn wait_for_event(
    rx: &mut broadcast::Receiver<JobEvent>,
    pred: impl Fn(&JobEvent) -> bool,
) -> Option<JobEvent> {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match rx.recv().await {
                Ok(event) if pred(&event) => return Some(event),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
    .await
    .ok()
    .flatten()
}

/// Poll the store until the job reaches a terminal status.
pub async fn wait_for_terminal(store: &dyn JobStore, id: JobId) -> Option<Job> {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match store.get(id).await {
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

pub fn is_status(event: &JobEvent, id: JobId, status: JobStatus) -> bool {
    matches!(event, JobEvent::StatusChanged { job_id, new_status, .. } if *job_id == id && *new_status == status)
}
