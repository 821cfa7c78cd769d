//! REST API Server for the strategy consultant
//!
//! Hosts one `ViewSession` per browser session and serves the views and
//! dashboard tabs the UI renders.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::dashboard::{tab_index, DashboardTab, TabView};
use crate::error::SessionError;
use crate::state::{SessionStore, GENERIC_ERROR_MESSAGE};

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InputRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StrategyRequest {
    pub description: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn ok<T: Serialize>(data: T) -> ApiResult {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

fn session_error(err: SessionError) -> ApiResult {
    let status = match err {
        SessionError::NotFound(_) => StatusCode::NOT_FOUND,
        SessionError::InvalidTransition { .. } => StatusCode::CONFLICT,
    };
    (status, Json(ApiResponse::error(err.to_string())))
}

fn respond<T: Serialize>(result: Result<T, SessionError>) -> ApiResult {
    match result {
        Ok(data) => ok(data),
        Err(e) => session_error(e),
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub sessions: SessionStore,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Session Endpoints
/// =============================

async fn create_session(State(state): State<ApiState>) -> ApiResult {
    let view = state.sessions.create().await;
    (StatusCode::CREATED, Json(ApiResponse::success(view)))
}

async fn get_session(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    respond(state.sessions.view(id).await)
}

async fn update_input(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(req): Json<InputRequest>,
) -> ApiResult {
    respond(state.sessions.set_input(id, req.text).await)
}

async fn submit(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    match state.sessions.submit(id).await {
        // The generation keeps running after the response is sent
        Ok(submission) => {
            let status = if submission.task.is_some() {
                StatusCode::ACCEPTED
            } else {
                StatusCode::OK
            };
            (status, Json(ApiResponse::success(submission.view)))
        }
        Err(e) => session_error(e),
    }
}

async fn reset(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    respond(state.sessions.reset(id).await)
}

async fn retry(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    respond(state.sessions.retry(id).await)
}

async fn delete_session(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    match state.sessions.remove(id).await {
        Ok(()) => ok(serde_json::json!({ "session_id": id })),
        Err(e) => session_error(e),
    }
}

async fn list_tabs() -> ApiResult {
    ok(tab_index())
}

async fn get_tab(
    State(state): State<ApiState>,
    Path((id, tab)): Path<(Uuid, String)>,
) -> ApiResult {
    let tab = match tab.parse::<DashboardTab>() {
        Ok(tab) => tab,
        Err(e) => return (StatusCode::NOT_FOUND, Json(ApiResponse::error(e))),
    };

    match state.sessions.report(id).await {
        Ok(report) => ok(TabView::of(&report, tab)),
        Err(e) => session_error(e),
    }
}

/// =============================
/// Direct Generation Endpoint
/// =============================

async fn generate_strategy(
    State(state): State<ApiState>,
    Json(req): Json<StrategyRequest>,
) -> ApiResult {
    if req.description.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("description must not be blank".into())),
        );
    }

    match state
        .sessions
        .orchestrator()
        .generate_report(&req.description)
        .await
    {
        Ok(report) => ok(report),
        Err(e) => {
            warn!(kind = e.kind(), error = %e, "Direct generation failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::error(GENERIC_ERROR_MESSAGE.to_string())),
            )
        }
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(sessions: SessionStore) -> Router {
    let state = ApiState { sessions };

    Router::new()
        .route("/health", get(health))
        .route("/api/tabs", get(list_tabs))
        .route("/api/strategy", post(generate_strategy))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/input", put(update_input))
        .route("/api/sessions/:id/submit", post(submit))
        .route("/api/sessions/:id/reset", post(reset))
        .route("/api/sessions/:id/retry", post(retry))
        .route("/api/sessions/:id/tabs/:tab", get(get_tab))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// =============================
/// Server Startup
/// =============================

/// Serve the API and sweep idle sessions until the process exits
pub async fn start_server(
    sessions: SessionStore,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let sweeper = sessions.spawn_sweeper();
    info!("Session idle TTL: {:?}", sessions.idle_ttl());
    let router = create_router(sessions);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    let served = axum::serve(listener, router).await;
    sweeper.abort();
    served?;

    Ok(())
}
