//! # Fake Generation Service
//!
//! A throwaway axum server that speaks the generation service protocol:
//! `POST /generateText/` mints a task id, `GET /task/:task_id` reports
//! `"Task Pending"` for a configurable number of polls and then the result.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Prompt that makes the fake service omit `task_id` from its answer
pub const PROMPT_WITHOUT_TASK_ID: &str = "respond without a task id";
/// Prompt that makes the fake service fail the submission
pub const PROMPT_SERVER_ERROR: &str = "respond with a server error";
/// Prompt that makes the fake service answer with an empty `task_id`
pub const PROMPT_EMPTY_TASK_ID: &str = "respond with an empty task id";
/// Prompt that makes the fake service answer with a numeric `task_id`
pub const PROMPT_NUMERIC_TASK_ID: &str = "respond with a numeric task id";

/// How the fake service behaves for every task
#[derive(Debug, Clone)]
pub struct FakeBehavior {
    /// Polls answered with the pending marker before the result is returned
    pub pending_rounds: usize,
    pub result: String,
}

impl FakeBehavior {
    pub fn pending_then(pending_rounds: usize, result: &str) -> Self {
        Self {
            pending_rounds,
            result: result.to_string(),
        }
    }

    pub fn never_finishes() -> Self {
        Self::pending_then(usize::MAX, "unreachable")
    }
}

#[derive(Debug, Default)]
struct ServiceLog {
    tasks: HashMap<String, usize>,
    submissions: Vec<Value>,
    status_requests: usize,
    authorization: Vec<Option<String>>,
}

#[derive(Clone)]
struct ServiceState {
    behavior: FakeBehavior,
    log: Arc<Mutex<ServiceLog>>,
}

/// Running fake service
pub struct TestServer {
    pub base_url: String,
    log: Arc<Mutex<ServiceLog>>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Start the fake service on an ephemeral local port
    pub async fn start(behavior: FakeBehavior) -> Self {
        let log = Arc::new(Mutex::new(ServiceLog::default()));
        let state = ServiceState {
            behavior,
            log: log.clone(),
        };

        let app = Router::new()
            .route("/generateText/", post(generate_text))
            .route("/task/:task_id", get(task_status))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Server failed to start");
        });

        Self {
            base_url: format!("http://{}", addr),
            log,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Request bodies received by the generate endpoint
    pub fn submissions(&self) -> Vec<Value> {
        self.log.lock().submissions.clone()
    }

    /// Status queries received, across all tasks
    pub fn status_requests(&self) -> usize {
        self.log.lock().status_requests
    }

    /// Authorization headers seen on generate requests
    pub fn authorization_headers(&self) -> Vec<Option<String>> {
        self.log.lock().authorization.clone()
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

async fn generate_text(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let prompt = body
        .get("prompt")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let mut log = state.log.lock();
    log.submissions.push(body.clone());
    log.authorization.push(
        headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );

    match prompt.as_str() {
        PROMPT_WITHOUT_TASK_ID => Json(json!({ "status": "queued" })).into_response(),
        PROMPT_EMPTY_TASK_ID => Json(json!({ "task_id": "" })).into_response(),
        PROMPT_NUMERIC_TASK_ID => Json(json!({ "task_id": 42 })).into_response(),
        PROMPT_SERVER_ERROR => {
            (StatusCode::INTERNAL_SERVER_ERROR, "worker queue unavailable").into_response()
        }
        _ => {
            let task_id = uuid::Uuid::new_v4().to_string();
            log.tasks.insert(task_id.clone(), 0);
            Json(json!({ "task_id": task_id })).into_response()
        }
    }
}

async fn task_status(
    State(state): State<ServiceState>,
    Path(task_id): Path<String>,
) -> Response {
    let mut log = state.log.lock();
    log.status_requests += 1;

    let Some(polls) = log.tasks.get_mut(&task_id) else {
        return (StatusCode::NOT_FOUND, "unknown task").into_response();
    };
    *polls += 1;

    if *polls <= state.behavior.pending_rounds {
        Json(json!("Task Pending")).into_response()
    } else {
        Json(json!(state.behavior.result)).into_response()
    }
}
