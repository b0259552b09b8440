//! Streaming HTTP client for the upstream completion API.

use super::protocol::{ChatCompletionRequest, WireMessage};
use crate::config::Config;
use crate::error::UpstreamError;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;

/// Raw body stream of one upstream response. Dropping it aborts the
/// connection, which is how downstream cancellation propagates upstream.
pub type ByteStream = BoxStream<'static, Result<Bytes, reqwest::Error>>;

pub struct UpstreamClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl UpstreamClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.upstream_connect_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.upstream_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Open a streaming chat completion over the given context.
    ///
    /// Returns the raw byte stream on success; the caller owns incremental
    /// framing. Non-success statuses are drained for their body and mapped
    /// to [`UpstreamError::Status`].
    pub async fn chat_stream(
        &self,
        model: &str,
        messages: Vec<WireMessage>,
    ) -> Result<ByteStream, UpstreamError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model,
            messages,
            stream: true,
        };

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                body = %truncate(&body_text, 500),
                "upstream rejected completion request"
            );
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: truncate(&body_text, 200).to_string(),
            });
        }

        Ok(response.bytes_stream().boxed())
    }
}

/// Clip a string to at most `max` bytes on a char boundary.
fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
