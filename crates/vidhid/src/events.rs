//! Audit event emission.

use std::sync::Mutex;

use tracing::{info, warn};

use vidhi_common::AuditEvent;

/// Receives every audit record the engine produces. Durable persistence is
/// wired up outside this crate.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: AuditEvent);
}

/// Serializes each record to JSON and logs it under a dedicated target.
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: AuditEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => info!(target: "vidhid::audit", %payload),
            Err(e) => warn!("audit record serialization failed: {}", e),
        }
    }
}

/// Collects records in memory for test assertions.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything emitted so far, in emission order.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event);
    }
}
