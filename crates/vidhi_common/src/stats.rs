//! Monitoring snapshots and samples.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One background reading of system load plus query counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub taken_at: DateTime<Utc>,
    pub cpu_percent: f32,
    pub mem_percent: f32,
    pub active_queries: u64,
    pub total_queries: u64,
    pub avg_response_ms: f64,
    pub success_rate: f64,
}

/// Point-in-time view of the monitor, composed under one lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSnapshot {
    pub uptime_seconds: u64,
    pub total_queries: u64,
    pub failed_queries: u64,
    pub success_rate: f64,
    pub active_queries: u64,
    pub avg_response_ms: f64,
    pub cpu_percent: f32,
    pub mem_percent: f32,
    pub queries_last_minute: u64,
}
