//! Query accounting and performance history.
//!
//! One mutex guards all counters and windows so every snapshot and sample is
//! internally consistent. Per-query accounting goes through [`QueryTicket`],
//! which records exactly one completion even when the query future is
//! cancelled mid-flight.

pub mod ring;
pub mod sampler;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::Utc;
use vidhi_common::{MonitorSnapshot, PerformanceSample};

use ring::RingBuffer;

/// Completions kept for the latency and rate windows.
pub const RESPONSE_WINDOW: usize = 100;

/// Completions averaged for the rolling latency figure.
pub const AVG_WINDOW: usize = 10;

/// Window for the queries-last-minute rate.
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Samples older than this are trimmed when a new sample is appended.
pub const HISTORY_MAX_AGE: Duration = Duration::from_secs(3600);

/// Samples returned by [`QueryMonitor::history`].
pub const HISTORY_RETURN: usize = 20;

struct Completion {
    finished: Instant,
    elapsed: Duration,
}

struct MonitorInner {
    active: u64,
    total: u64,
    failed: u64,
    completions: RingBuffer<Completion>,
    history: Vec<(Instant, PerformanceSample)>,
}

/// Shared query counters plus load-sample history.
pub struct QueryMonitor {
    started: Instant,
    inner: Mutex<MonitorInner>,
}

impl QueryMonitor {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            inner: Mutex::new(MonitorInner {
                active: 0,
                total: 0,
                failed: 0,
                completions: RingBuffer::new(RESPONSE_WINDOW),
                history: Vec::new(),
            }),
        }
    }

    /// Start accounting for one query: bumps the active count and hands back
    /// the ticket that must record the completion.
    pub fn begin_query(self: &Arc<Self>) -> QueryTicket {
        self.lock().active += 1;
        QueryTicket {
            monitor: Arc::clone(self),
            started_at: Instant::now(),
            completed: false,
        }
    }

    /// Append one load sample composed from the current counters, then trim
    /// history entries older than [`HISTORY_MAX_AGE`].
    pub fn record_sample(&self, cpu_percent: f32, mem_percent: f32) {
        self.sample_at(cpu_percent, mem_percent, Instant::now());
    }

    /// Consistent view of all counters and windows.
    pub fn snapshot(&self) -> MonitorSnapshot {
        self.snapshot_at(Instant::now())
    }

    /// The last [`HISTORY_RETURN`] samples, oldest first.
    pub fn history(&self) -> Vec<PerformanceSample> {
        let inner = self.lock();
        let skip = inner.history.len().saturating_sub(HISTORY_RETURN);
        inner
            .history
            .iter()
            .skip(skip)
            .map(|(_, sample)| sample.clone())
            .collect()
    }

    fn finish(&self, started_at: Instant, success: bool) {
        self.finish_at(started_at, success, Instant::now());
    }

    fn finish_at(&self, started_at: Instant, success: bool, now: Instant) {
        let elapsed = now.duration_since(started_at);
        let mut inner = self.lock();
        inner.active = inner.active.saturating_sub(1);
        inner.total += 1;
        if !success {
            inner.failed += 1;
        }
        inner.completions.push(Completion {
            finished: now,
            elapsed,
        });
    }

    fn sample_at(&self, cpu_percent: f32, mem_percent: f32, now: Instant) {
        let mut inner = self.lock();
        let sample = PerformanceSample {
            taken_at: Utc::now(),
            cpu_percent,
            mem_percent,
            active_queries: inner.active,
            total_queries: inner.total,
            avg_response_ms: avg_response_ms(&inner.completions),
            success_rate: success_rate(inner.total, inner.failed),
        };
        inner.history.push((now, sample));
        inner
            .history
            .retain(|(taken, _)| now.duration_since(*taken) <= HISTORY_MAX_AGE);
    }

    fn snapshot_at(&self, now: Instant) -> MonitorSnapshot {
        let inner = self.lock();
        let (cpu_percent, mem_percent) = inner
            .history
            .last()
            .map(|(_, sample)| (sample.cpu_percent, sample.mem_percent))
            .unwrap_or((0.0, 0.0));
        let queries_last_minute = inner
            .completions
            .iter()
            .filter(|c| now.duration_since(c.finished) <= RATE_WINDOW)
            .count() as u64;
        MonitorSnapshot {
            uptime_seconds: now.duration_since(self.started).as_secs(),
            total_queries: inner.total,
            failed_queries: inner.failed,
            success_rate: success_rate(inner.total, inner.failed),
            active_queries: inner.active,
            avg_response_ms: avg_response_ms(&inner.completions),
            cpu_percent,
            mem_percent,
            queries_last_minute,
        }
    }

    // A panicking holder must not wedge the monitor.
    fn lock(&self) -> MutexGuard<'_, MonitorInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for QueryMonitor {
    fn default() -> Self {
        Self::new()
    }
}

fn avg_response_ms(completions: &RingBuffer<Completion>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0u32;
    for completion in completions.last_n(AVG_WINDOW) {
        sum += completion.elapsed.as_secs_f64() * 1000.0;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}

fn success_rate(total: u64, failed: u64) -> f64 {
    total.saturating_sub(failed) as f64 / total.max(1) as f64
}

/// Accounting handle for one in-flight query.
///
/// [`complete`](QueryTicket::complete) records the real outcome; dropping an
/// uncompleted ticket (panic, cancelled future) records a failure instead.
/// Either way the completion is counted exactly once.
pub struct QueryTicket {
    monitor: Arc<QueryMonitor>,
    started_at: Instant,
    completed: bool,
}

impl QueryTicket {
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Record the completion and consume the ticket.
    pub fn complete(mut self, success: bool) {
        self.completed = true;
        self.monitor.finish(self.started_at, success);
    }
}

impl Drop for QueryTicket {
    fn drop(&mut self) {
        if !self.completed {
            self.monitor.finish(self.started_at, false);
        }
    }
}
