//! Stub upstream services
//!
//! A single axum app standing in for everything the discover pipeline talks to:
//! the catalog Web API under `/v1`, an Ollama chat endpoint under `/api` and a
//! similarity index under `/similarity`. Every request is recorded so tests can
//! assert on what was sent.

use super::constants::*;
use super::fixtures;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Knobs for making individual upstreams misbehave.
#[derive(Clone, Copy, Debug, Default)]
pub struct StubOptions {
    /// Album track listings answer 500.
    pub failing_album_tracks: bool,
    /// The interpretation oracle replies with prose instead of JSON.
    pub garbled_interpretation: bool,
}

/// One request received by the stub.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub path: String,
    pub query: HashMap<String, String>,
}

#[derive(Clone)]
struct StubState {
    options: StubOptions,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubState {
    fn record(&self, path: String, query: HashMap<String, String>) {
        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest { path, query });
    }
}

pub struct StubServices {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl StubServices {
    pub async fn spawn(options: StubOptions) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            options,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/v1/search", get(search))
            .route("/v1/artists/{id}/top-tracks", get(artist_top_tracks))
            .route("/v1/playlists/{id}/tracks", get(playlist_tracks))
            .route("/v1/albums/{id}/tracks", get(album_tracks))
            .route("/api/chat", post(chat))
            .route("/similarity/query", post(similarity_query))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub services");
        let port = listener
            .local_addr()
            .expect("Failed to get stub address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Stub services failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            requests,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL to hand to the catalog client.
    pub fn catalog_url(&self) -> String {
        format!("{}/v1", self.base_url)
    }

    pub fn llm_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn similarity_url(&self) -> String {
        format!("{}/similarity/query", self.base_url)
    }

    /// Requests received so far whose path starts with `prefix`, in arrival order.
    pub fn requests_to(&self, prefix: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path.starts_with(prefix))
            .cloned()
            .collect()
    }
}

impl Drop for StubServices {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TEST_TOKEN))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": { "status": 401, "message": "The access token expired" } })),
    )
        .into_response()
}

async fn search(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record("/v1/search".to_string(), query.clone());
    if !authorized(&headers) {
        return unauthorized();
    }
    let kind = query.get("type").cloned().unwrap_or_default();
    Json(fixtures::search_response(&kind)).into_response()
}

async fn artist_top_tracks(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record(format!("/v1/artists/{}/top-tracks", id), query);
    if !authorized(&headers) {
        return unauthorized();
    }
    if id != ARTIST_ID {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(fixtures::artist_top_tracks_response()).into_response()
}

async fn playlist_tracks(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record(format!("/v1/playlists/{}/tracks", id), query);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(fixtures::playlist_tracks_response()).into_response()
}

async fn album_tracks(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record(format!("/v1/albums/{}/tracks", id), query);
    if !authorized(&headers) {
        return unauthorized();
    }
    if state.options.failing_album_tracks {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }
    Json(fixtures::album_tracks_response()).into_response()
}

/// Ollama `/api/chat`. The system instruction tells the two oracles apart:
/// only the interpreter's mentions the feature groups.
async fn chat(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    state.record("/api/chat".to_string(), HashMap::new());

    let messages = body["messages"].as_array().cloned().unwrap_or_default();
    let content_of = |role: &str| {
        messages
            .iter()
            .find(|m| m["role"] == role)
            .and_then(|m| m["content"].as_str())
            .unwrap_or_default()
            .to_string()
    };
    let system = content_of("system");
    let user = content_of("user");

    let reply = if system.contains("bounded_cols") {
        if state.options.garbled_interpretation {
            "Sure! Here are some calmer songs you might enjoy.".to_string()
        } else {
            format!("```json\n{}\n```", fixtures::adjustment_reply())
        }
    } else {
        fixtures::entities_reply(&user).to_string()
    };

    Json(json!({
        "model": body["model"],
        "message": { "role": "assistant", "content": reply },
        "done": true,
        "done_reason": "stop",
        "prompt_eval_count": 42,
        "eval_count": 24,
    }))
    .into_response()
}

async fn similarity_query(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    let mut query = HashMap::new();
    query.insert(
        "dimensions".to_string(),
        body["vector"]
            .as_array()
            .map(|v| v.len())
            .unwrap_or(0)
            .to_string(),
    );
    query.insert("limit".to_string(), body["limit"].to_string());
    state.record("/similarity/query".to_string(), query);

    Json(fixtures::similarity_response()).into_response()
}
