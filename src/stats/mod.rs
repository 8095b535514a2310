//! In-process request statistics.
//!
//! # Design Decisions
//! - One store per server, shared through `AppState`, never global
//! - Counter is a single atomic; increments are never lost under concurrency
//! - Uptime uses a monotonic clock so it never goes backwards
//! - Nothing is persisted; a restart starts from zero

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of the statistics, as served on `/status`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Seconds since the store was created.
    pub uptime: f64,
    /// Successfully proxied requests so far.
    pub request_count: u64,
}

/// Process-lifetime counters.
#[derive(Debug)]
pub struct StatsStore {
    started: Instant,
    started_at: DateTime<Utc>,
    request_count: AtomicU64,
}

impl StatsStore {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            started_at: Utc::now(),
            request_count: AtomicU64::new(0),
        }
    }

    /// Wall-clock start time.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Record one completed proxy request. Returns the new total.
    pub fn increment(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime: self.started.elapsed().as_secs_f64(),
            request_count: self.request_count(),
        }
    }
}

impl Default for StatsStore {
    fn default() -> Self {
        Self::new()
    }
}
