//! Shared utilities for integration tests: an in-process fake backend and
//! a host wired to it.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use mule_trace::batch::MemoryClipboard;
use mule_trace::config::{AuthConfig, ClientConfig};
use mule_trace::host::{ConfiguredCredentials, Credentials, WorkflowHost};
use mule_trace::HttpGateway;

pub const USER: &str = "analyst";
pub const PASSWORD: &str = "letmein";

/// Scripted responses and a record of what the client sent.
#[derive(Default)]
pub struct BackendState {
    checks: Mutex<HashMap<String, Value>>,
    mined: Mutex<HashSet<String>>,
    polls: Mutex<Vec<String>>,
    uploads: Mutex<Vec<(String, Vec<u8>)>>,
    upload_response: Mutex<Option<(u16, Value)>>,
}

impl BackendState {
    /// Answer `POST /check_txn` for `txn_id` with `body`.
    pub fn script_check(&self, txn_id: &str, body: Value) {
        self.checks.lock().unwrap().insert(txn_id.to_string(), body);
    }

    pub fn set_mined(&self, hash: &str) {
        self.mined.lock().unwrap().insert(hash.to_string());
    }

    pub fn script_upload(&self, status: u16, body: Value) {
        *self.upload_response.lock().unwrap() = Some((status, body));
    }

    pub fn polls_for(&self, hash: &str) -> usize {
        self.polls.lock().unwrap().iter().filter(|h| *h == hash).count()
    }

    pub fn total_polls(&self) -> usize {
        self.polls.lock().unwrap().len()
    }

    pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.uploads.lock().unwrap().clone()
    }
}

type Shared = Arc<BackendState>;

async fn check_txn(State(state): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let txn_id = body["txn_id"].as_str().unwrap_or_default().to_string();
    match state.checks.lock().unwrap().get(&txn_id) {
        Some(verdict) => (StatusCode::OK, Json(verdict.clone())),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Transaction not found" })),
        ),
    }
}

async fn txn_status(State(state): State<Shared>, Path(hash): Path<String>) -> Json<Value> {
    state.polls.lock().unwrap().push(hash.clone());
    let mined = state.mined.lock().unwrap().contains(&hash);
    Json(json!({ "mined": mined }))
}

async fn upload_csv(State(state): State<Shared>, mut multipart: Multipart) -> (StatusCode, Json<Value>) {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        state.uploads.lock().unwrap().push((name, bytes));
    }

    match state.upload_response.lock().unwrap().clone() {
        Some((status, body)) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(body),
        ),
        None => (StatusCode::OK, Json(json!({ "processed": 0, "results": [] }))),
    }
}

/// Start the fake backend on an ephemeral port.
pub async fn start_backend() -> (SocketAddr, Shared) {
    let state: Shared = Arc::default();
    let app = Router::new()
        .route("/check_txn", post(check_txn))
        .route("/txn_status/{hash}", get(txn_status))
        .route("/upload_csv", post(upload_csv))
        .with_state(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

/// Client config pointed at `addr` with a short polling interval.
pub fn config_for(addr: SocketAddr) -> ClientConfig {
    let mut config = ClientConfig {
        auth: AuthConfig {
            username: USER.to_string(),
            password: PASSWORD.to_string(),
        },
        ..ClientConfig::default()
    };
    config.backend.base_url = format!("http://{addr}");
    config.backend.submit_timeout_secs = 5;
    config.backend.poll_timeout_secs = 1;
    config.polling.interval_ms = 50;
    config.batch.copy_indicator_ms = 100;
    config
}

pub type TestHost = WorkflowHost<HttpGateway, MemoryClipboard>;

/// A logged-in host talking to `config`'s backend.
pub fn logged_in_host(config: &ClientConfig) -> (TestHost, Arc<MemoryClipboard>) {
    let gateway = Arc::new(HttpGateway::new(&config.backend, true).unwrap());
    let clipboard = Arc::new(MemoryClipboard::new());
    let auth = ConfiguredCredentials::from_config(&config.auth);
    let mut host = WorkflowHost::new(gateway, Arc::clone(&clipboard), config, auth);
    host.login(&Credentials::new(USER, PASSWORD)).unwrap();
    (host, clipboard)
}

/// Wait until `condition` holds or `limit` elapses.
pub async fn eventually(limit: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
