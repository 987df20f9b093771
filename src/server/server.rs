use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::discover::{DiscoverOutcome, PipelineOrchestrator};
use crate::error::{DiscoverError, ErrorKind};
use crate::features::{self, PreferenceVector};
use tower_http::services::ServeDir;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::credentials::CatalogCredentials;
use super::metrics::metrics_handler;
use super::{log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct DiscoverBody {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Serialize)]
struct VectorResponse {
    vector: PreferenceVector,
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

/// HTTP status for a finished discover run.
fn outcome_status(outcome: &DiscoverOutcome) -> StatusCode {
    if outcome.success {
        return StatusCode::OK;
    }
    match outcome.error_kind {
        Some(ErrorKind::Auth) => StatusCode::UNAUTHORIZED,
        Some(ErrorKind::Validation) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(ErrorKind::Parse) | Some(ErrorKind::Oracle) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn post_discover(
    credentials: Option<CatalogCredentials>,
    State(orchestrator): State<GuardedOrchestrator>,
    Json(body): Json<DiscoverBody>,
) -> Response {
    let query = match body.query.as_deref().map(str::trim) {
        Some(query) if !query.is_empty() => query.to_string(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": "Query is required" })),
            )
                .into_response()
        }
    };

    let token = credentials.map(|c| c.0);
    let outcome = orchestrator
        .discover(&query, token.as_ref(), body.limit)
        .await;

    (outcome_status(&outcome), Json(outcome)).into_response()
}

/// Takes the raw body so malformed JSON gets the same error envelope as a
/// failed validation.
async fn post_vector(body: String) -> Response {
    match features::build_from_json(&body) {
        Ok(vector) => Json(VectorResponse { vector }).into_response(),
        Err(err) => (
            vector_error_status(&err),
            Json(json!({
                "success": false,
                "error": err.to_string(),
                "error_kind": err.kind(),
            })),
        )
            .into_response(),
    }
}

fn vector_error_status(err: &DiscoverError) -> StatusCode {
    match err {
        DiscoverError::Parse(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

pub fn make_app(config: ServerConfig, orchestrator: Arc<PipelineOrchestrator>) -> Result<Router> {
    let state = ServerState::new(config.clone(), orchestrator);

    let discover_routes: Router = Router::new()
        .route("/discover", post(post_discover))
        .route("/vector", post(post_vector))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let app: Router = home_router
        .nest("/v1", discover_routes)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(config: ServerConfig, orchestrator: Arc<PipelineOrchestrator>) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, orchestrator)?;

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, make_metrics_app()).await {
            error!("Metrics server stopped: {}", e);
        }
    });
    info!("Metrics available at port {}!", metrics_port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Ready to serve at port {}!", port);

    Ok(axum::serve(listener, app).await?)
}
