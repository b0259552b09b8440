//! The streaming relay: one exchange from upstream bytes to downstream
//! events, with commit-on-exit semantics.
//!
//! Three triggers race for every exchange: upstream data arrival, upstream
//! end-of-stream, and downstream disconnect. All of them funnel into a
//! single [`EndState`], and the session commit happens exactly once based on
//! that state, so late upstream events can never write to a finished exchange.

use crate::services::markdown;
use crate::services::session::StreamGuard;
use crate::sse::{self, LineBuffer};
use crate::state::AppState;
use crate::types::{RelayEvent, Turn};
use crate::upstream::protocol;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use tokio::sync::mpsc;

/// How one relay exchange ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndState {
    /// Upstream finished: `[DONE]` seen, or its stream ended cleanly.
    Completed,
    /// Downstream went away before upstream finished.
    Disconnected,
    /// Upstream failed mid-stream.
    Failed(String),
}

/// Ephemeral state owned by one in-flight exchange.
pub struct StreamSession {
    tx: mpsc::Sender<RelayEvent>,
    reply: String,
    deltas: usize,
}

impl StreamSession {
    pub fn new(tx: mpsc::Sender<RelayEvent>) -> Self {
        Self {
            tx,
            reply: String::new(),
            deltas: 0,
        }
    }

    /// Accumulated reply text so far.
    pub fn reply(&self) -> &str {
        &self.reply
    }

    /// Content deltas forwarded so far.
    pub fn deltas(&self) -> usize {
        self.deltas
    }

    /// Pump the upstream byte stream, re-framing records downstream.
    ///
    /// Every delta is accumulated before it is forwarded, so the partial
    /// reply is intact even when the forward fails. Returning drops the
    /// byte stream, which aborts the upstream connection.
    pub async fn pump<S, E>(&mut self, mut upstream: S) -> EndState
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Display,
    {
        let mut lines = LineBuffer::new();

        loop {
            let read = tokio::select! {
                _ = self.tx.closed() => return EndState::Disconnected,
                read = upstream.next() => read,
            };
            let Some(read) = read else { break };

            let chunk = match read {
                Ok(chunk) => chunk,
                Err(err) => return EndState::Failed(err.to_string()),
            };

            for line in lines.push(&chunk) {
                let Some(payload) = sse::data_payload(&line) else {
                    continue;
                };
                if payload == sse::DONE_MARKER {
                    return self.finish_downstream().await;
                }
                let Some(delta) = protocol::delta_content(payload) else {
                    // malformed or content-free record
                    continue;
                };
                if delta.is_empty() {
                    continue;
                }
                self.reply.push_str(&delta);
                self.deltas += 1;
                if self.tx.send(RelayEvent::Content(delta)).await.is_err() {
                    return EndState::Disconnected;
                }
            }
        }

        // upstream ended without a [DONE] record
        self.finish_downstream().await
    }

    /// Terminate the downstream stream with its single `[DONE]`.
    ///
    /// The reply is complete at this point, so a downstream that vanished
    /// between the last delta and the terminal record still counts as a
    /// completed exchange.
    async fn finish_downstream(&mut self) -> EndState {
        let _ = self.tx.send(RelayEvent::Done).await;
        EndState::Completed
    }

    /// Surface an in-band failure, then terminate the stream.
    pub async fn fail(&mut self, message: String) {
        let _ = self.tx.send(RelayEvent::Error(message)).await;
        let _ = self.tx.send(RelayEvent::Done).await;
    }
}

/// Drive one `/ask` exchange end to end.
///
/// Owns the commit semantics: clean completion commits the rendered reply,
/// a downstream disconnect commits accumulated partial content with a
/// stopped marker (or nothing, if nothing arrived), an upstream failure is
/// surfaced in-band and commits whatever partial content exists.
pub async fn run_exchange(
    state: AppState,
    sid: String,
    model: String,
    guard: StreamGuard,
    tx: mpsc::Sender<RelayEvent>,
) {
    // held for the lifetime of the exchange; dropping releases the session
    let _guard = guard;

    let history = state.sessions.history(&sid);
    let context = protocol::context_from(&history);
    let mut session = StreamSession::new(tx);

    let upstream = match state.upstream.chat_stream(&model, context).await {
        Ok(stream) => stream,
        Err(err) => {
            tracing::error!(session = %sid, error = %err, "upstream call failed");
            session.fail(err.user_message()).await;
            return;
        }
    };

    let end = session.pump(upstream).await;
    state.metrics.record_deltas(session.deltas());

    match end {
        EndState::Completed => {
            let html = markdown::markdown_to_html(session.reply());
            state.sessions.append_turn(&sid, Turn::assistant(html));
            state.metrics.record_completed();
            tracing::debug!(session = %sid, deltas = session.deltas(), "exchange completed");
        }
        EndState::Disconnected => {
            if !session.reply().is_empty() {
                let html =
                    markdown::markdown_to_html(session.reply()) + markdown::STOPPED_MARKER_HTML;
                state.sessions.append_turn(&sid, Turn::assistant(html));
            }
            state.metrics.record_cancelled();
            tracing::info!(session = %sid, "client disconnected, upstream request aborted");
        }
        EndState::Failed(detail) => {
            tracing::error!(session = %sid, error = %detail, "upstream stream failed");
            session
                .fail(crate::error::GENERIC_ERROR_MESSAGE.to_string())
                .await;
            if !session.reply().is_empty() {
                let html = markdown::markdown_to_html(session.reply());
                state.sessions.append_turn(&sid, Turn::assistant(html));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::convert::Infallible;

    fn byte_chunks(
        parts: &[&str],
    ) -> impl Stream<Item = Result<Bytes, Infallible>> + Unpin {
        let owned: Vec<Result<Bytes, Infallible>> = parts
            .iter()
            .map(|part| Ok(Bytes::from(part.to_string())))
            .collect();
        stream::iter(owned)
    }

    fn delta(text: &str) -> String {
        format!("data: {{\"choices\":[{{\"delta\":{{\"content\":\"{text}\"}}}}]}}\n\n")
    }

    fn drain(rx: &mut mpsc::Receiver<RelayEvent>) -> Vec<RelayEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn forwards_deltas_and_accumulates_reply() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut session = StreamSession::new(tx);

        let upstream = byte_chunks(&[
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            &delta("Hel"),
            &delta("lo"),
            "data: [DONE]\n\n",
        ]);

        let end = session.pump(upstream).await;
        assert_eq!(end, EndState::Completed);
        assert_eq!(session.reply(), "Hello");
        assert_eq!(session.deltas(), 2);

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![
                RelayEvent::Content("Hel".to_string()),
                RelayEvent::Content("lo".to_string()),
                RelayEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn reassembles_records_fragmented_across_reads() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut session = StreamSession::new(tx);

        let upstream = byte_chunks(&[
            "data: {\"choices\":[{\"del",
            "ta\":{\"content\":\"split\"}}]}\n\ndata: [D",
            "ONE]\n\n",
        ]);

        let end = session.pump(upstream).await;
        assert_eq!(end, EndState::Completed);
        assert_eq!(session.reply(), "split");
        assert_eq!(
            drain(&mut rx),
            vec![RelayEvent::Content("split".to_string()), RelayEvent::Done]
        );
    }

    #[tokio::test]
    async fn skips_malformed_records() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut session = StreamSession::new(tx);

        let upstream = byte_chunks(&[
            "data: {not json at all\n\n",
            ": keep-alive\n\n",
            &delta("ok"),
            "data: [DONE]\n\n",
        ]);

        let end = session.pump(upstream).await;
        assert_eq!(end, EndState::Completed);
        assert_eq!(session.reply(), "ok");
        assert_eq!(drain(&mut rx).len(), 2); // one content, one done
    }

    #[tokio::test]
    async fn emits_done_when_upstream_ends_without_marker() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut session = StreamSession::new(tx);

        let end = session.pump(byte_chunks(&[&delta("tail")])).await;
        assert_eq!(end, EndState::Completed);
        assert_eq!(drain(&mut rx).last(), Some(&RelayEvent::Done));
    }

    #[tokio::test]
    async fn ignores_records_after_done() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut session = StreamSession::new(tx);

        let trailing = format!("data: [DONE]\n\n{}data: [DONE]\n\n", delta("late"));
        let end = session.pump(byte_chunks(&[&delta("early"), &trailing])).await;

        assert_eq!(end, EndState::Completed);
        assert_eq!(session.reply(), "early");
        let events = drain(&mut rx);
        let done_count = events.iter().filter(|e| **e == RelayEvent::Done).count();
        assert_eq!(done_count, 1);
    }

    #[tokio::test]
    async fn downstream_disconnect_keeps_partial_reply() {
        let (tx, mut rx) = mpsc::channel(16);

        let handle = tokio::spawn(async move {
            let mut session = StreamSession::new(tx);
            let upstream = byte_chunks(&[&delta("one "), &delta("two ")])
                .chain(stream::pending::<Result<Bytes, Infallible>>());
            let end = session.pump(upstream).await;
            (end, session.reply().to_string())
        });

        // take the first delta, then walk away mid-stream
        let first = rx.recv().await.unwrap();
        assert!(matches!(first, RelayEvent::Content(_)));
        drop(rx);

        let (end, reply) = handle.await.unwrap();
        assert_eq!(end, EndState::Disconnected);
        assert!(reply.starts_with("one "));
    }

    #[tokio::test]
    async fn upstream_read_error_fails_the_exchange() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut session = StreamSession::new(tx);

        let items: Vec<Result<Bytes, String>> = vec![
            Ok(Bytes::from(delta("partial"))),
            Err("connection reset".to_string()),
        ];
        let end = session.pump(stream::iter(items)).await;

        assert_eq!(end, EndState::Failed("connection reset".to_string()));
        assert_eq!(session.reply(), "partial");

        session.fail("upstream failed".to_string()).await;
        let events = drain(&mut rx);
        assert_eq!(events.last(), Some(&RelayEvent::Done));
        assert!(events
            .iter()
            .any(|e| matches!(e, RelayEvent::Error(msg) if msg == "upstream failed")));
    }

    #[tokio::test]
    async fn fail_after_disconnect_is_a_no_op() {
        let (tx, rx) = mpsc::channel(16);
        drop(rx);
        let mut session = StreamSession::new(tx);
        // both sends fail silently; nothing panics
        session.fail("nobody listening".to_string()).await;
    }
}
