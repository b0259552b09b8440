//! Wire types for the OpenAI-compatible chat-completions API.

use crate::services::markdown;
use crate::types::Turn;
use serde::{Deserialize, Serialize};

/// Streaming completion request body.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage>,
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireMessage {
    pub role: &'static str,
    pub content: String,
}

/// Map stored session history to upstream context.
///
/// Content goes out as plain text: stored `<br>` markup reverts to literal
/// newlines, order is preserved verbatim.
pub fn context_from(history: &[Turn]) -> Vec<WireMessage> {
    history
        .iter()
        .map(|turn| WireMessage {
            role: turn.role.as_str(),
            content: markdown::restore_line_breaks(&turn.content),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

/// Extract the content delta from one upstream `data:` payload.
///
/// Role-only and finish-reason chunks carry no content and yield `None`, as
/// do malformed records; callers skip both without aborting the stream.
pub fn delta_content(payload: &str) -> Option<String> {
    let chunk: ChatChunk = serde_json::from_str(payload).ok()?;
    chunk.choices.into_iter().next()?.delta.content
}
