use crate::config::Config;
use crate::services::metrics::Metrics;
use crate::services::session::SessionStore;
use crate::services::templates::TemplateEngine;
use crate::upstream::UpstreamClient;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionStore>,
    pub upstream: Arc<UpstreamClient>,
    pub templates: Arc<TemplateEngine>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let upstream = UpstreamClient::new(&config)?;
        let templates = TemplateEngine::new()?;
        let sessions = SessionStore::new(Duration::from_secs(config.session_ttl_secs));

        Ok(Self {
            sessions: Arc::new(sessions),
            upstream: Arc::new(upstream),
            templates: Arc::new(templates),
            metrics: Arc::new(Metrics::new()),
            config: Arc::new(config),
        })
    }
}
