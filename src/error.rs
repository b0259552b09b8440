//! Error types for the relay.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failures detected before the event-stream response opens.
///
/// These map to a conventional failed HTTP status with a JSON error body.
/// Anything that goes wrong after the stream has opened is delivered in-band
/// instead (an `{"error": ...}` record followed by `[DONE]`).
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("A reply is already streaming for this session")]
    SessionBusy,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match &self {
            RelayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RelayError::SessionBusy => StatusCode::CONFLICT,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Fallback message for failures whose details belong in the log, not the
/// browser.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Failures from the upstream completion call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl UpstreamError {
    /// Message safe to surface to the browser; details stay in the log.
    pub fn user_message(&self) -> String {
        match self {
            UpstreamError::Status { status, .. } => format!(
                "Error: API returned status {status}. Check server logs for details."
            ),
            UpstreamError::Transport(_) => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}
