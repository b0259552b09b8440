use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub host: String,
    pub port: u16,

    // Upstream completion API
    pub upstream_base_url: String,
    pub api_key: String,
    pub upstream_connect_timeout_secs: u64,

    // Sessions
    pub session_secret: String,
    pub session_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,

            upstream_base_url: env::var("OPENROUTER_BASE_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1".to_string()),
            api_key: env::var("OPENROUTER_API_KEY")
                .context("OPENROUTER_API_KEY is not set")?,
            upstream_connect_timeout_secs: 10,

            session_secret: env::var("SESSION_SECRET")
                .unwrap_or_else(|_| "supersecretkey".to_string()),
            session_ttl_secs: env::var("SESSION_TTL_SECS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()?,
        })
    }
}
