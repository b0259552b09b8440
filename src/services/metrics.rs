//! Relay counters for the health endpoint.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

pub struct Metrics {
    requests: AtomicUsize,
    deltas_relayed: AtomicUsize,
    completed: AtomicUsize,
    cancelled: AtomicUsize,
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            requests: AtomicUsize::new(0),
            deltas_relayed: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            cancelled: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_deltas(&self, count: usize) {
        self.deltas_relayed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            deltas_relayed: self.deltas_relayed.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests: usize,
    pub deltas_relayed: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub uptime_seconds: u64,
}
