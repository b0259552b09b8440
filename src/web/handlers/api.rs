//! Model catalog and session reset endpoints.

use crate::services::catalog;
use crate::state::AppState;
use crate::types::ModelInfo;
use crate::web::cookie;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

/// Full static model descriptor set.
pub async fn list_models() -> Json<&'static [ModelInfo]> {
    Json(catalog::MODELS)
}

/// Clear the session's turn history. Takes effect for any subsequent
/// request on the same identifier.
pub async fn clear_session(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    if let Some(sid) = cookie::session_from_headers(&headers, &state.config.session_secret) {
        state.sessions.clear(&sid);
        tracing::debug!(session = %sid, "session history cleared");
    }
    StatusCode::OK
}
