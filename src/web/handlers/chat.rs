use crate::state::AppState;
use crate::web::cookie;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (sid, fresh) = cookie::resolve(&headers, &state.config.session_secret);
    let history = state.sessions.history(&sid);

    let html = match state.templates.render_chat_page(&history) {
        Ok(html) => html,
        Err(err) => {
            tracing::error!(error = %err, "failed to render chat page");
            "<!DOCTYPE html><html><body><h1>Template error</h1></body></html>".to_string()
        }
    };

    let mut response = Html(html).into_response();
    if fresh {
        super::ask::apply_session_cookie(&mut response, &state, &sid);
    }
    response
}
