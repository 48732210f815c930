//! HTTP handlers
//!
//! Every response is HTTP 200; failures travel inside the body. The legacy
//! endpoint answers in the dashboard's `status` shape, the v2 endpoints
//! return the [`Outcome`] envelope as-is.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use serde_json::{Value, json};
use shared::{AppError, ErrorCode};
use std::collections::HashMap;

use super::actions::ReadRequest;
use super::envelope::Outcome;
use super::legacy::to_legacy;
use crate::core::ServerState;

/// Run router work off the async workers; workbook and kv access block
async fn run_blocking<F>(work: F) -> Outcome
where
    F: FnOnce() -> Outcome + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("spawn_blocking join error: {e}");
            Outcome::from_error(AppError::with_message(
                ErrorCode::HandlerPanicked,
                format!("Request handler failed: {e}"),
            ))
        }
    }
}

async fn read(state: ServerState, params: HashMap<String, String>) -> Outcome {
    let request = ReadRequest::from_params(params);
    run_blocking(move || state.router.read(&request)).await
}

async fn write(state: ServerState, body: Bytes) -> Outcome {
    run_blocking(move || state.router.write_raw(&body)).await
}

/// GET /exec
pub async fn legacy_read(
    State(state): State<ServerState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    Json(to_legacy(read(state, params).await))
}

/// POST /exec
pub async fn legacy_write(State(state): State<ServerState>, body: Bytes) -> Json<Value> {
    Json(to_legacy(write(state, body).await))
}

/// GET /api/v2/read
pub async fn v2_read(
    State(state): State<ServerState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Outcome> {
    Json(read(state, params).await)
}

/// POST /api/v2/write
pub async fn v2_write(State(state): State<ServerState>, body: Bytes) -> Json<Outcome> {
    Json(write(state, body).await)
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
