//! Health check endpoint

use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::json;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "chat-relay",
            "version": env!("CARGO_PKG_VERSION"),
            "relay": state.metrics.snapshot(),
        })),
    )
}
