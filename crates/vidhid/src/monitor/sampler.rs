//! Background resource sampler feeding the monitor history.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sysinfo::System;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use vidhi_common::VidhiError;

use super::QueryMonitor;

/// One CPU/memory reading in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceReading {
    pub cpu_percent: f32,
    pub mem_percent: f32,
}

/// Source of load readings. Production uses [`SysinfoProbe`]; tests inject
/// [`FakeProbe`] for deterministic readings and forced faults.
pub trait ResourceProbe: Send {
    fn sample(&mut self) -> Result<ResourceReading, VidhiError>;
}

/// sysinfo-backed probe.
pub struct SysinfoProbe {
    system: System,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        Self {
            system: System::new_all(),
        }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceProbe for SysinfoProbe {
    fn sample(&mut self) -> Result<ResourceReading, VidhiError> {
        self.system.refresh_all();
        let cpu_percent = self.system.global_cpu_info().cpu_usage();
        let total = self.system.total_memory();
        let used = self.system.used_memory();
        let mem_percent = if total == 0 {
            0.0
        } else {
            (used as f32 / total as f32) * 100.0
        };
        Ok(ResourceReading {
            cpu_percent,
            mem_percent,
        })
    }
}

/// Scripted probe for tests: queued readings first, then a steady fallback.
pub struct FakeProbe {
    queue: VecDeque<Result<ResourceReading, VidhiError>>,
    fallback: ResourceReading,
    calls: Arc<AtomicUsize>,
}

impl FakeProbe {
    /// Always returns the same reading.
    pub fn steady(cpu_percent: f32, mem_percent: f32) -> Self {
        Self {
            queue: VecDeque::new(),
            fallback: ResourceReading {
                cpu_percent,
                mem_percent,
            },
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns the scripted results in order, then zeros.
    pub fn scripted(readings: Vec<Result<ResourceReading, VidhiError>>) -> Self {
        Self {
            queue: readings.into(),
            fallback: ResourceReading {
                cpu_percent: 0.0,
                mem_percent: 0.0,
            },
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Counter handle that stays valid after the probe moves into the task.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl ResourceProbe for FakeProbe {
    fn sample(&mut self) -> Result<ResourceReading, VidhiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.queue.pop_front() {
            Some(result) => result,
            None => Ok(self.fallback),
        }
    }
}

/// Running sampler task. Dropping the handle detaches the task; call
/// [`shutdown`](SamplerHandle::shutdown) for a clean stop.
pub struct SamplerHandle {
    notify: Arc<Notify>,
    task: JoinHandle<()>,
}

impl SamplerHandle {
    /// Interrupt the current wait and join the task.
    pub async fn shutdown(self) {
        self.notify.notify_one();
        let _ = self.task.await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn the sampling loop: read the probe, record into the monitor, wait.
/// A probe fault is logged and the next attempt waits `retry_interval`
/// instead of `sample_interval`. The first reading happens immediately.
pub fn spawn_sampler(
    monitor: Arc<QueryMonitor>,
    mut probe: Box<dyn ResourceProbe>,
    sample_interval: Duration,
    retry_interval: Duration,
) -> SamplerHandle {
    let notify = Arc::new(Notify::new());
    let shutdown = Arc::clone(&notify);
    let task = tokio::spawn(async move {
        loop {
            let wait = match probe.sample() {
                Ok(reading) => {
                    monitor.record_sample(reading.cpu_percent, reading.mem_percent);
                    debug!(
                        cpu = reading.cpu_percent,
                        mem = reading.mem_percent,
                        "load sample recorded"
                    );
                    sample_interval
                }
                Err(e) => {
                    warn!("load sampling failed, backing off: {}", e);
                    retry_interval
                }
            };
            if !wait_uninterrupted(&shutdown, wait).await {
                break;
            }
        }
        debug!("sampler stopped");
    });
    SamplerHandle { notify, task }
}

/// True when the full wait elapsed without a shutdown notification.
async fn wait_uninterrupted(notify: &Notify, duration: Duration) -> bool {
    tokio::time::timeout(duration, notify.notified()).await.is_err()
}
