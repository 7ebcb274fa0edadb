//! Prediction HTTP server.
//!
//! Exposes the ranking pipeline as a small JSON API for review-dashboard
//! frontends and browser extensions.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/predict_topk` | Rank duplicate candidates for a patch |
//! | `GET`  | `/health` | Health check (version + loaded projects) |
//!
//! # Error Contract
//!
//! All error responses share one JSON envelope:
//!
//! ```json
//! { "error": { "code": "not_found", "message": "patch '42' not found in dataset or review API" } }
//! ```
//!
//! Error codes: `bad_request` (400), `unknown_project` (400), `not_found`
//! (404), `scoring_failed` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser-based review
//! tooling can call the API cross-origin.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::models::PredictionEntry;
use crate::predict::{self, PredictError};
use crate::registry::Registry;

/// Shared application state passed to all route handlers via Axum's `State`
/// extractor.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    registry: Arc<Registry>,
}

/// Starts the prediction HTTP server.
///
/// Binds to the address configured in `[server].bind` and serves until the
/// process is terminated. The registry is loaded by the caller so startup
/// failures surface before the socket is bound.
pub async fn run_server(config: Config, registry: Registry) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();

    let state = AppState {
        config: Arc::new(config),
        registry: Arc::new(registry),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/predict_topk", post(handle_predict))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    tracing::info!("patch-radar listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"unknown_project"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        let (status, code) = match &err {
            PredictError::UnknownProject(_) => (StatusCode::BAD_REQUEST, "unknown_project"),
            PredictError::PatchNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            PredictError::Scoring(_) => (StatusCode::INTERNAL_SERVER_ERROR, "scoring_failed"),
        };
        AppError {
            status,
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    /// Keys of the projects loaded at startup.
    projects: Vec<String>,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        projects: state
            .registry
            .keys()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}

// ============ POST /predict_topk ============

/// Request body for `POST /predict_topk`. Omitted `time_window`/`top_k`
/// fall back to the `[retrieval]` defaults.
#[derive(Deserialize)]
struct PredictRequest {
    project: String,
    patch_id: String,
    #[serde(default)]
    time_window: Option<i64>,
    #[serde(default)]
    top_k: Option<i64>,
}

async fn handle_predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<Vec<PredictionEntry>>, AppError> {
    let window_days = request
        .time_window
        .unwrap_or(state.config.retrieval.window_days);
    let top_k = request
        .top_k
        .unwrap_or(state.config.retrieval.top_k as i64);

    if window_days < 0 {
        return Err(bad_request("time_window must be >= 0"));
    }
    if top_k < 0 {
        return Err(bad_request("top_k must be >= 0"));
    }
    let patch_id = request.patch_id.trim();
    if patch_id.is_empty() {
        return Err(bad_request("patch_id must not be empty"));
    }

    let results = predict::run_predict(
        &state.registry,
        &state.config.embedding,
        &request.project,
        patch_id,
        top_k as usize,
        window_days,
    )
    .await?;

    Ok(Json(results))
}
