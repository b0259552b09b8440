//! In-memory session store.
//!
//! Sessions are process-scoped, keyed by the opaque identifier carried in
//! the client's cookie. Turn history is append-only; the expiry policy is
//! injected at construction and enforced by [`SessionStore::purge_expired`].

use crate::types::Turn;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub struct SessionStore {
    inner: Mutex<HashMap<String, SessionEntry>>,
    ttl: Duration,
}

struct SessionEntry {
    turns: Vec<Turn>,
    last_seen: Instant,
    streaming: bool,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            turns: Vec::new(),
            last_seen: Instant::now(),
            streaming: false,
        }
    }

    fn touch(&mut self) {
        self.last_seen = Instant::now();
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Ordered turn history for a session; empty for unknown identifiers.
    pub fn history(&self, sid: &str) -> Vec<Turn> {
        let mut sessions = self.inner.lock().unwrap();
        match sessions.get_mut(sid) {
            Some(entry) => {
                entry.touch();
                entry.turns.clone()
            }
            None => Vec::new(),
        }
    }

    pub fn append_turn(&self, sid: &str, turn: Turn) {
        let mut sessions = self.inner.lock().unwrap();
        let entry = sessions
            .entry(sid.to_string())
            .or_insert_with(SessionEntry::new);
        entry.touch();
        entry.turns.push(turn);
    }

    pub fn clear(&self, sid: &str) {
        let mut sessions = self.inner.lock().unwrap();
        if let Some(entry) = sessions.get_mut(sid) {
            entry.touch();
            entry.turns.clear();
        }
    }

    pub fn turn_count(&self, sid: &str) -> usize {
        let sessions = self.inner.lock().unwrap();
        sessions.get(sid).map_or(0, |entry| entry.turns.len())
    }

    /// Mark a session as having a stream in flight.
    ///
    /// Returns `None` while another exchange is streaming on the same
    /// session. The flag is released when the returned guard drops, so it
    /// cannot leak across error paths.
    pub fn begin_stream(self: &Arc<Self>, sid: &str) -> Option<StreamGuard> {
        let mut sessions = self.inner.lock().unwrap();
        let entry = sessions
            .entry(sid.to_string())
            .or_insert_with(SessionEntry::new);
        if entry.streaming {
            return None;
        }
        entry.streaming = true;
        entry.touch();
        Some(StreamGuard {
            store: Arc::clone(self),
            sid: sid.to_string(),
        })
    }

    /// Drop sessions idle past the configured TTL, returning how many.
    pub fn purge_expired(&self) -> usize {
        let mut sessions = self.inner.lock().unwrap();
        let before = sessions.len();
        let ttl = self.ttl;
        sessions.retain(|_, entry| entry.streaming || entry.last_seen.elapsed() < ttl);
        before - sessions.len()
    }

    fn end_stream(&self, sid: &str) {
        let mut sessions = self.inner.lock().unwrap();
        if let Some(entry) = sessions.get_mut(sid) {
            entry.streaming = false;
            entry.touch();
        }
    }
}

/// RAII marker for one in-flight exchange on a session.
pub struct StreamGuard {
    store: Arc<SessionStore>,
    sid: String,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.store.end_stream(&self.sid);
    }
}
