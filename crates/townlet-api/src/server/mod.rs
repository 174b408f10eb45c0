use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, Request, State};
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use contracts::{
    AgentSnapshot, ApiError, ChatMessageView, ErrorCode, EventView, RunStatus, SimTime,
    WorldSnapshot, SCHEMA_VERSION_V1,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::EngineApi;

include!("error.rs");
include!("state.rs");
include!("routes/control.rs");
include!("routes/inspect.rs");

/// Serves a single pre-built engine until the process exits.
pub async fn serve(addr: SocketAddr, engine: EngineApi) -> Result<(), ServerError> {
    serve_shared(addr, Arc::new(Mutex::new(engine))).await
}

/// Serves an engine the caller keeps a handle to, e.g. for self-paced ticks.
pub async fn serve_shared(
    addr: SocketAddr,
    engine: Arc<Mutex<EngineApi>>,
) -> Result<(), ServerError> {
    let state = AppState { inner: engine };
    let app = router(state);

    tracing::info!(%addr, "api listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/status", get(get_status))
        .route("/api/v1/start", post(start_run))
        .route("/api/v1/pause", post(pause_run))
        .route("/api/v1/step", post(step_run))
        .route("/api/v1/run_to_tick", post(run_to_tick))
        .route("/api/v1/agents", get(list_agents))
        .route("/api/v1/agents/{agent_id}", get(get_agent))
        .route("/api/v1/events", get(get_events))
        .route("/api/v1/chat/{place_id}", get(get_chat))
        .route("/api/v1/world", get(get_world))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}

fn apply_cors_headers(headers: &mut axum::http::HeaderMap) {
    headers.insert(
        HeaderName::from_static("access-control-allow-origin"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-methods"),
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-headers"),
        HeaderValue::from_static("content-type"),
    );
}

#[cfg(test)]
mod tests;
