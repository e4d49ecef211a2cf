//! Monitor bookkeeping through the public ticket API.
//!
//! The time-window arithmetic (rate window, history age) is unit-tested
//! inside the monitor module with explicit instants; these tests cover the
//! live ticket lifecycle end to end.

use std::sync::Arc;

use approx::assert_relative_eq;

use vidhid::monitor::QueryMonitor;

// ============================================================================
// Fresh State
// ============================================================================

/// A monitor with no traffic reports zeroes across the board
#[test]
fn fresh_monitor_reports_zeroed_stats() {
    let monitor = QueryMonitor::new();
    let stats = monitor.snapshot();
    assert_eq!(stats.total_queries, 0);
    assert_eq!(stats.failed_queries, 0);
    assert_eq!(stats.active_queries, 0);
    assert_eq!(stats.queries_last_minute, 0);
    assert_relative_eq!(stats.success_rate, 0.0);
    assert_relative_eq!(stats.avg_response_ms, 0.0);
    assert_eq!(stats.cpu_percent, 0.0);
    assert_eq!(stats.mem_percent, 0.0);
    assert!(monitor.history().is_empty());
}

// ============================================================================
// Ticket Lifecycle
// ============================================================================

/// Completed tickets feed totals, failures, and the success rate
#[test]
fn completed_tickets_feed_the_counters() {
    let monitor = Arc::new(QueryMonitor::new());
    monitor.begin_query().complete(true);
    monitor.begin_query().complete(true);
    monitor.begin_query().complete(false);

    let stats = monitor.snapshot();
    assert_eq!(stats.total_queries, 3);
    assert_eq!(stats.failed_queries, 1);
    assert_eq!(stats.active_queries, 0);
    assert_eq!(stats.queries_last_minute, 3);
    assert_relative_eq!(stats.success_rate, 2.0 / 3.0, epsilon = 1e-9);
}

/// Active count follows open tickets, and a dropped ticket is a failure
#[test]
fn open_tickets_are_active_until_resolved() {
    let monitor = Arc::new(QueryMonitor::new());
    let first = monitor.begin_query();
    let second = monitor.begin_query();
    assert_eq!(monitor.snapshot().active_queries, 2);

    first.complete(true);
    assert_eq!(monitor.snapshot().active_queries, 1);

    drop(second);
    let stats = monitor.snapshot();
    assert_eq!(stats.active_queries, 0);
    assert_eq!(stats.total_queries, 2);
    assert_eq!(stats.failed_queries, 1);
}

/// A failed completion is still a response sample in the rate window
#[test]
fn failed_completion_joins_the_rate_window() {
    let monitor = Arc::new(QueryMonitor::new());
    monitor.begin_query().complete(false);

    let stats = monitor.snapshot();
    assert_eq!(stats.queries_last_minute, 1);
    assert_relative_eq!(stats.success_rate, 0.0);
}

/// Tickets resolve correctly when completed from other threads
#[test]
fn tickets_complete_across_threads() {
    let monitor = Arc::new(QueryMonitor::new());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let ticket = monitor.begin_query();
            std::thread::spawn(move || ticket.complete(i % 4 != 0))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = monitor.snapshot();
    assert_eq!(stats.total_queries, 8);
    assert_eq!(stats.failed_queries, 2);
    assert_eq!(stats.active_queries, 0);
}

// ============================================================================
// Samples
// ============================================================================

/// Recorded samples surface in the snapshot and the history
#[test]
fn recorded_samples_surface_in_snapshot_and_history() {
    let monitor = Arc::new(QueryMonitor::new());
    monitor.begin_query().complete(true);
    monitor.record_sample(42.0, 67.5);

    let stats = monitor.snapshot();
    assert_relative_eq!(stats.cpu_percent, 42.0);
    assert_relative_eq!(stats.mem_percent, 67.5);

    let history = monitor.history();
    assert_eq!(history.len(), 1);
    assert_relative_eq!(history[0].cpu_percent, 42.0);
    assert_eq!(history[0].total_queries, 1);
    assert_relative_eq!(history[0].success_rate, 1.0, epsilon = 1e-9);
}
