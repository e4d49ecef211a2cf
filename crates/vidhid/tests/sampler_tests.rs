//! Sampler loop tests on tokio's paused clock.
//!
//! With start_paused the runtime auto-advances time whenever every task is
//! blocked on a timer, so tick counts are exact without real sleeping.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use vidhi_common::VidhiError;
use vidhid::monitor::sampler::{spawn_sampler, FakeProbe, ResourceReading};
use vidhid::monitor::QueryMonitor;

const SAMPLE_EVERY: Duration = Duration::from_millis(10);
const RETRY_AFTER: Duration = Duration::from_millis(50);

// ============================================================================
// Cadence
// ============================================================================

/// The first reading lands immediately, then one per interval
#[tokio::test(start_paused = true)]
async fn sampler_records_on_a_steady_cadence() {
    let monitor = Arc::new(QueryMonitor::new());
    let probe = FakeProbe::steady(12.5, 50.0);
    let handle = spawn_sampler(monitor.clone(), Box::new(probe), SAMPLE_EVERY, RETRY_AFTER);

    tokio::time::sleep(Duration::from_millis(35)).await;

    // Samples at 0, 10, 20, and 30 ms.
    let history = monitor.history();
    assert_eq!(history.len(), 4);
    assert!(history.iter().all(|s| s.cpu_percent == 12.5));

    handle.shutdown().await;
}

// ============================================================================
// Fault Backoff
// ============================================================================

/// A probe fault waits out the retry interval before the next attempt
#[tokio::test(start_paused = true)]
async fn probe_fault_backs_off_on_the_retry_interval() {
    let monitor = Arc::new(QueryMonitor::new());
    let probe = FakeProbe::scripted(vec![
        Err(VidhiError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "stat read failed",
        ))),
        Ok(ResourceReading {
            cpu_percent: 30.0,
            mem_percent: 40.0,
        }),
    ]);
    let calls = probe.call_counter();
    let handle = spawn_sampler(monitor.clone(), Box::new(probe), SAMPLE_EVERY, RETRY_AFTER);

    tokio::time::sleep(Duration::from_millis(65)).await;

    // Fault at 0 ms, scripted reading at 50 ms, fallback reading at 60 ms.
    let history = monitor.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].cpu_percent, 30.0);
    assert_eq!(history[1].cpu_percent, 0.0);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    handle.shutdown().await;
}

// ============================================================================
// Shutdown
// ============================================================================

/// Shutdown interrupts the wait and no further samples land
#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_loop_promptly() {
    let monitor = Arc::new(QueryMonitor::new());
    let probe = FakeProbe::steady(5.0, 5.0);
    let handle = spawn_sampler(
        monitor.clone(),
        Box::new(probe),
        Duration::from_secs(3600),
        RETRY_AFTER,
    );

    tokio::task::yield_now().await;
    assert_eq!(monitor.history().len(), 1);
    assert!(!handle.is_finished());

    handle.shutdown().await;

    tokio::time::sleep(Duration::from_secs(7200)).await;
    assert_eq!(monitor.history().len(), 1);
}
