//! HTTP surface for the presentation layer.
//!
//! Every response uses the `{ success, data?, error? }` envelope. Plan
//! generation and regeneration sit behind the shared-password gate when one
//! is configured.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use mealprep_core::access::{AccessGate, GateError};
use mealprep_core::orchestrator::{OrchestratorError, PlanOrchestrator};
use mealprep_core::plan::{GrocerySection, MealType, Recipe, sample_plan};

/// Header carrying the shared access password.
pub const ACCESS_HEADER: &str = "x-access-password";

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<PlanOrchestrator>,
    gate: Arc<AccessGate>,
}

impl AppState {
    pub fn new(orchestrator: PlanOrchestrator, gate: AccessGate) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            gate: Arc::new(gate),
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope and error type
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn success<T: Serialize>(data: Option<T>) -> Response {
    Json(Envelope {
        success: true,
        data,
        error: None,
    })
    .into_response()
}

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{err:#}"),
        }
    }
}

impl From<OrchestratorError> for AppError {
    fn from(err: OrchestratorError) -> Self {
        let status = if err.is_timeout() {
            StatusCode::GATEWAY_TIMEOUT
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: format!("{:#}", anyhow::Error::new(err)),
        }
    }
}

impl From<GateError> for AppError {
    fn from(err: GateError) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = self.status.as_u16(), error = %self.message, "request failed");
        }
        let body: Envelope<()> = Envelope {
            success: false,
            data: None,
            error: Some(self.message),
        };
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub guidance: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateRequest {
    pub original_recipe: Recipe,
    pub feedback: String,
    pub meal_type: MealType,
    pub all_lunches: Vec<Recipe>,
    pub all_dinners: Vec<Recipe>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateResponse {
    pub recipe: Recipe,
    pub grocery_list: Vec<GrocerySection>,
}

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub gate_enabled: bool,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/generate", post(generate))
        .route("/regenerate", post(regenerate))
        .route("/unlock", post(unlock))
        .route("/sample", get(sample))
        .route("/health", get(health))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "request",
                    id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    if !state.gate.is_enabled() {
        warn!("no access password configured; the HTTP surface is open");
    }
    let app = build_router(state);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    info!("mealprep serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("mealprep serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let candidate = headers.get(ACCESS_HEADER).and_then(|v| v.to_str().ok());
    state.gate.check(candidate).map_err(|e| {
        warn!(reason = %e, "access gate rejected request");
        AppError::from(e)
    })
}

/// An empty or undecodable body means "no guidance".
async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    authorize(&state, &headers)?;

    let request: GenerateRequest = serde_json::from_slice(&body).unwrap_or_default();
    let plan = state
        .orchestrator
        .generate_full_plan(request.guidance.as_deref())
        .await?;

    Ok(success(Some(plan)))
}

async fn regenerate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    authorize(&state, &headers)?;

    let request: RegenerateRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::bad_request(format!("invalid regenerate request: {e}")))?;

    let outcome = state
        .orchestrator
        .regenerate_and_merge(
            &request.all_lunches,
            &request.all_dinners,
            &request.original_recipe,
            &request.feedback,
            request.meal_type,
        )
        .await?;

    Ok(success(Some(RegenerateResponse {
        recipe: outcome.recipe,
        grocery_list: outcome.grocery_list,
    })))
}

async fn unlock(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let request: UnlockRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::bad_request(format!("invalid unlock request: {e}")))?;
    state.gate.check(Some(&request.password))?;
    Ok(success::<()>(None))
}

async fn sample() -> Result<Response, AppError> {
    let plan = sample_plan().map_err(|e| AppError::internal(e.into()))?;
    Ok(success(Some(plan)))
}

async fn health(State(state): State<AppState>) -> Response {
    success(Some(HealthResponse {
        status: "ok",
        gate_enabled: state.gate.is_enabled(),
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
