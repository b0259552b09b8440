//! The `/ask` relay endpoint.

use crate::error::RelayError;
use crate::services::{catalog, markdown, relay};
use crate::state::AppState;
use crate::types::{AskRequest, Turn};
use crate::web::cookie;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

/// Handle one chat turn: validate, append the user turn, open the
/// event-stream response, and hand the exchange to the relay task.
///
/// Failures here, before the stream opens, come back as plain HTTP
/// statuses with a JSON body; everything later is in-band.
pub async fn ask(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AskRequest>,
) -> Result<Response, RelayError> {
    let message = req.message.trim().to_string();
    if message.is_empty() {
        return Err(RelayError::InvalidInput("No message provided"));
    }
    if !catalog::contains(&req.model) {
        return Err(RelayError::InvalidInput("Invalid model selected"));
    }

    let (sid, fresh) = cookie::resolve(&headers, &state.config.session_secret);

    let guard = state
        .sessions
        .begin_stream(&sid)
        .ok_or(RelayError::SessionBusy)?;

    tracing::info!(session = %sid, model = %req.model, "relay request accepted");
    state.metrics.record_request();

    state
        .sessions
        .append_turn(&sid, Turn::user(markdown::sanitize_user_input(&message)));

    let (tx, rx) = mpsc::channel(100);
    tokio::spawn(relay::run_exchange(
        state.clone(),
        sid.clone(),
        req.model,
        guard,
        tx,
    ));

    let stream = ReceiverStream::new(rx)
        .map(|event| Ok::<_, Infallible>(Event::default().data(event.sse_data())));

    let sse = Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keep-alive"),
    );

    let mut response = sse.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    if fresh {
        apply_session_cookie(&mut response, &state, &sid);
    }
    Ok(response)
}

pub(super) fn apply_session_cookie(response: &mut Response, state: &AppState, sid: &str) {
    let value = cookie::set_cookie(
        &state.config.session_secret,
        sid,
        state.config.session_ttl_secs,
    );
    if let Ok(value) = HeaderValue::from_str(&value) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
}
