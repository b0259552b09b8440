use serde_json::json;

/// Normalized event forwarded to the downstream client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// One incremental fragment of generated text.
    Content(String),
    /// In-band failure; the stream still terminates with [`RelayEvent::Done`].
    Error(String),
    /// Terminal record, emitted exactly once per stream.
    Done,
}

impl RelayEvent {
    /// Payload for the `data:` field of one SSE record.
    pub fn sse_data(&self) -> String {
        match self {
            RelayEvent::Content(delta) => json!({ "content": delta }).to_string(),
            RelayEvent::Error(message) => json!({ "error": message }).to_string(),
            RelayEvent::Done => crate::sse::DONE_MARKER.to_string(),
        }
    }
}
