//! Local stand-in for the Discogs search endpoint
//!
//! Serves a scripted sequence of responses on `GET /database/search`; once
//! the script runs out the last response repeats. Every request is recorded
//! with its arrival time, query and auth headers.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub enum FakeResponse {
    Status(u16),
    Json(Value),
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub at: Instant,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
}

struct FakeState {
    script: Vec<FakeResponse>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct FakeCatalog {
    pub base_url: String,
    state: Arc<FakeState>,
    server: JoinHandle<()>,
}

impl FakeCatalog {
    pub async fn start(script: Vec<FakeResponse>) -> Self {
        let state = Arc::new(FakeState {
            script,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/database/search", get(search))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake catalog");
        let addr = listener.local_addr().expect("fake catalog address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            server,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }
}

impl Drop for FakeCatalog {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn search(
    State(state): State<Arc<FakeState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let index = {
        let mut requests = state.requests.lock().unwrap();
        requests.push(RecordedRequest {
            at: Instant::now(),
            query,
            authorization: header("authorization"),
            user_agent: header("user-agent"),
        });
        requests.len() - 1
    };

    let response = state
        .script
        .get(index)
        .or_else(|| state.script.last())
        .cloned()
        .unwrap_or(FakeResponse::Json(serde_json::json!({ "results": [] })));

    match response {
        FakeResponse::Status(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        FakeResponse::Json(body) => Json(body).into_response(),
    }
}
