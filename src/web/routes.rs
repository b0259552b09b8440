use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // Pages
        .route("/", get(super::handlers::chat::index))
        // API endpoints
        .route("/ask", post(super::handlers::ask::ask))
        .route("/models", get(super::handlers::api::list_models))
        .route("/clear", post(super::handlers::api::clear_session))
        // Health check
        .route("/health", get(super::handlers::health::health_check))
        .with_state(state)
}
