//! Structured audit records for the query stream.
//!
//! Persistence (JSONL files, shipping) happens outside this workspace; the
//! daemon only builds and emits these records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest question prefix kept in a query record.
pub const QUERY_LOG_CHARS: usize = 100;

/// One audit record, tagged by `event_type` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    QueryProcessed {
        query: String,
        elapsed_ms: u64,
        confidence: f64,
        sources_count: usize,
        success: bool,
        timestamp: DateTime<Utc>,
    },
    SystemEvent {
        event: String,
        details: serde_json::Value,
        timestamp: DateTime<Utc>,
    },
    Error {
        error_kind: String,
        message: String,
        context: String,
        timestamp: DateTime<Utc>,
    },
}

impl AuditEvent {
    /// Record a finished query. The question is truncated to
    /// [`QUERY_LOG_CHARS`] characters.
    pub fn query_processed(
        question: &str,
        elapsed_ms: u64,
        confidence: f64,
        sources_count: usize,
        success: bool,
    ) -> Self {
        AuditEvent::QueryProcessed {
            query: question.chars().take(QUERY_LOG_CHARS).collect(),
            elapsed_ms,
            confidence,
            sources_count,
            success,
            timestamp: Utc::now(),
        }
    }

    /// Record a lifecycle event with free-form details.
    pub fn system_event(event: impl Into<String>, details: serde_json::Value) -> Self {
        AuditEvent::SystemEvent {
            event: event.into(),
            details,
            timestamp: Utc::now(),
        }
    }

    /// Record a fault with the context it occurred in.
    pub fn error(
        error_kind: impl Into<String>,
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        AuditEvent::Error {
            error_kind: error_kind.into(),
            message: message.into(),
            context: context.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_record_is_tagged_on_the_wire() {
        let event = AuditEvent::query_processed("What is GST?", 42, 0.67, 2, true);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "query_processed");
        assert_eq!(json["sources_count"], 2);
        assert_eq!(json["success"], true);
    }

    #[test]
    fn long_questions_are_truncated() {
        let question = "q".repeat(150);
        let event = AuditEvent::query_processed(&question, 1, 0.0, 0, false);
        match event {
            AuditEvent::QueryProcessed { query, .. } => {
                assert_eq!(query.chars().count(), QUERY_LOG_CHARS);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn system_event_keeps_details() {
        let event = AuditEvent::system_event("query_started", json!({ "query_length": 21 }));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "system_event");
        assert_eq!(json["details"]["query_length"], 21);
    }

    #[test]
    fn error_record_carries_kind_and_context() {
        let event = AuditEvent::error("generation", "timed out", "LLM processing");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "error");
        assert_eq!(json["error_kind"], "generation");
        assert_eq!(json["context"], "LLM processing");
    }
}
