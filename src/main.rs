use anyhow::Result;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_relay::config::Config;
use chat_relay::state::AppState;
use chat_relay::web;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting chat-relay");

    // Load configuration
    let config = Config::from_env()?;

    // Create application state
    let state = AppState::new(config)?;

    // Sweep idle sessions in the background
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(600));
        loop {
            interval.tick().await;
            let dropped = sessions.purge_expired();
            if dropped > 0 {
                tracing::debug!(dropped, "purged idle sessions");
            }
        }
    });

    // Start web server
    web::start_server(state).await?;

    Ok(())
}
