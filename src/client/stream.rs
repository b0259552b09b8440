//! Submission and stream consumption against a running relay.
//!
//! Mirrors the relay's framing exactly: raw bytes in, incremental line
//! split, `data: ` records out. Cancellation is per request: each
//! submission gets its own [`CancelHandle`], no shared controller slot.

use crate::sse::{self, LineBuffer};
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::view::ChatView;

/// Appended to the accumulated text when the user stops generation.
pub const STOPPED_MARKER: &str = "\n\n*Generation stopped.*";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Empty message or model selection; callers skip these silently.
    #[error("message and model must be non-empty")]
    EmptyInput,
}

/// How one exchange ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The stream ran to its `[DONE]` record (or clean end).
    Completed,
    /// The user cancelled mid-stream; the text carries a stopped marker.
    Stopped,
    /// Server or transport failure, rendered inline by the view.
    Failed(String),
}

/// The accumulated result of one exchange.
#[derive(Debug)]
pub struct Reply {
    pub text: String,
    pub outcome: Outcome,
}

/// Cancellation handle for one in-flight exchange.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(CancellationToken);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the in-flight request. The consumption loop surfaces this as
    /// [`Outcome::Stopped`], distinct from any error path.
    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }

    async fn cancelled(&self) {
        self.0.cancelled().await;
    }
}

pub struct ChatClient {
    http: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            // cookie store keeps the session id across turns
            http: Client::builder()
                .cookie_store(true)
                .build()
                .unwrap_or_default(),
            base_url,
        }
    }

    /// Submit one chat turn and drive `view` until the exchange finishes.
    ///
    /// `view.finalize` runs exactly once on every path: completion,
    /// cancellation, and error.
    pub async fn send<V: ChatView>(
        &self,
        message: &str,
        model: &str,
        view: &mut V,
        cancel: &CancelHandle,
    ) -> Result<Reply, ClientError> {
        let message = message.trim();
        if message.is_empty() || model.is_empty() {
            return Err(ClientError::EmptyInput);
        }

        view.user_turn(message);
        view.placeholder();

        let mut text = String::new();
        let outcome = self
            .consume(message, model, view, cancel, &mut text)
            .await;
        if let Outcome::Failed(msg) = &outcome {
            view.error(msg);
        }
        view.finalize(&text);

        Ok(Reply { text, outcome })
    }

    async fn consume<V: ChatView>(
        &self,
        message: &str,
        model: &str,
        view: &mut V,
        cancel: &CancelHandle,
        text: &mut String,
    ) -> Outcome {
        let request = self
            .http
            .post(format!("{}/ask", self.base_url))
            .json(&json!({ "message": message, "model": model }))
            .send();

        let response = tokio::select! {
            _ = cancel.cancelled() => return stopped(text),
            response = request => match response {
                Ok(response) => response,
                Err(err) => return Outcome::Failed(format!("request failed: {err}")),
            },
        };

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| {
                    body.get("error")
                        .and_then(|e| e.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| format!("Server error: {status}"));
            return Outcome::Failed(message);
        }

        let mut body = response.bytes_stream().boxed();
        let mut lines = LineBuffer::new();
        let mut first_delta = true;

        loop {
            let read = tokio::select! {
                // dropping the body stream here aborts the request, which
                // the relay sees as a downstream disconnect
                _ = cancel.cancelled() => return stopped(text),
                read = body.next() => read,
            };
            let Some(read) = read else { break };

            let chunk = match read {
                Ok(chunk) => chunk,
                Err(err) => return Outcome::Failed(format!("stream read failed: {err}")),
            };

            for line in lines.push(&chunk) {
                let Some(payload) = sse::data_payload(&line) else {
                    continue;
                };
                if payload == sse::DONE_MARKER {
                    // normal terminal condition, but a cancel that raced
                    // the final record still reads as stopped
                    if cancel.is_cancelled() {
                        return stopped(text);
                    }
                    return Outcome::Completed;
                }

                match serde_json::from_str::<StreamPayload>(payload) {
                    Ok(StreamPayload {
                        error: Some(message),
                        ..
                    }) => return Outcome::Failed(message),
                    Ok(StreamPayload {
                        content: Some(delta),
                        ..
                    }) if !delta.is_empty() => {
                        if first_delta {
                            view.clear_placeholder();
                            first_delta = false;
                        }
                        text.push_str(&delta);
                        view.partial(text);
                    }
                    _ => {} // content-free or malformed record
                }
            }
        }

        if cancel.is_cancelled() {
            stopped(text)
        } else {
            Outcome::Completed
        }
    }
}

fn stopped(text: &mut String) -> Outcome {
    text.push_str(STOPPED_MARKER);
    Outcome::Stopped
}

#[derive(Debug, Deserialize)]
struct StreamPayload {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    error: Option<String>,
}
