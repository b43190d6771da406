//! REST API server for the ROI narrative service
//!
//! Exposes the calculator + narrative pipeline via HTTP endpoints
//! and serves the static front-end when one is present.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::calculator::compute_financials;
use crate::config::AppConfig;
use crate::error::RoiError;
use crate::models::{FinancialProjection, NarrativeOutput, RequestInput};
use crate::narrative::NarrativeService;

/// =============================
/// Response Models
/// =============================

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub ok: bool,
    pub model: String,
    pub latency_ms: u64,
    pub financials: FinancialProjection,
    pub output: NarrativeOutput,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn from_error(err: &RoiError) -> Self {
        Self {
            ok: false,
            error: err.error_code().to_string(),
            message: err.to_string(),
        }
    }
}

type ApiResult<T> = std::result::Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn reject(err: RoiError) -> (StatusCode, Json<ErrorResponse>) {
    (err.status_code(), Json(ErrorResponse::from_error(&err)))
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub narratives: Arc<NarrativeService>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "ok": true }))
}

/// =============================
/// Generate Endpoint
/// =============================

async fn generate(
    State(state): State<ApiState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> ApiResult<GenerateResponse> {
    let request_id = Uuid::new_v4();

    let Json(body) = body.map_err(|rejection| {
        warn!(%request_id, "Rejected request body: {}", rejection.body_text());
        reject(RoiError::InvalidInput(rejection.body_text()))
    })?;

    let input = RequestInput::from_value(&body).map_err(|e| {
        warn!(%request_id, "Invalid request: {}", e);
        reject(e)
    })?;

    info!(
        %request_id,
        customer = %input.customer_name,
        specialty = %input.specialty,
        audiences = input.audiences.len(),
        "Received ROI narrative request"
    );

    let financials = compute_financials(&input);

    let started = Instant::now();
    let output = state
        .narratives
        .build_and_normalize(&input, &financials)
        .await
        .map_err(|e| {
            error!(%request_id, "Narrative generation failed: {}", e);
            reject(e)
        })?;
    let latency_ms = started.elapsed().as_millis() as u64;

    info!(%request_id, latency_ms, "ROI narrative request completed");

    Ok(Json(GenerateResponse {
        ok: true,
        model: state.narratives.model().to_string(),
        latency_ms,
        financials,
        output,
    }))
}

/// =============================
/// Router
/// =============================

pub fn create_router(config: Arc<AppConfig>, narratives: Arc<NarrativeService>) -> Router {
    let static_dir = config.static_dir.clone();
    let state = ApiState { narratives };

    let router = Router::new()
        .route("/health", get(health))
        .route("/api/generate", post(generate))
        .with_state(state);

    let router = if Path::new(&static_dir).is_dir() {
        router.fallback_service(ServeDir::new(static_dir))
    } else {
        router
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    config: Arc<AppConfig>,
    narratives: Arc<NarrativeService>,
) -> crate::Result<()> {
    let port = config.port;
    let router = create_router(config, narratives);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
