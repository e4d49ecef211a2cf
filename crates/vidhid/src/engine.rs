//! Query pipeline: retrieve, assemble context, generate, score.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use vidhi_common::{preview, AuditEvent, Query, QueryOutcome, PREVIEW_CHARS};

use crate::events::EventSink;
use crate::llm::AnswerGenerator;
use crate::monitor::QueryMonitor;
use crate::prompts::{
    assemble_context, fallback_answer, NO_RESULTS_ANSWER, PROCESSING_ERROR_ANSWER,
};
use crate::retrieval::ChunkRetriever;
use crate::scoring::score_confidence;

/// Question prefix kept in failure audit context.
const ERROR_CONTEXT_CHARS: usize = 50;

/// The query pipeline with every collaborator injected.
pub struct QueryEngine {
    retriever: Arc<dyn ChunkRetriever>,
    generator: Arc<dyn AnswerGenerator>,
    monitor: Arc<QueryMonitor>,
    events: Arc<dyn EventSink>,
}

impl QueryEngine {
    pub fn new(
        retriever: Arc<dyn ChunkRetriever>,
        generator: Arc<dyn AnswerGenerator>,
        monitor: Arc<QueryMonitor>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            retriever,
            generator,
            monitor,
            events,
        }
    }

    /// Answer one query. Always returns an outcome: retrieval faults map to
    /// the fixed error answer, empty retrieval to the no-results answer, and
    /// generation faults to a local fallback that still counts as success.
    /// The monitor records each query exactly once, including when this
    /// future is cancelled mid-flight.
    pub async fn handle_query(&self, query: &Query) -> QueryOutcome {
        let ticket = self.monitor.begin_query();
        let request_id = Uuid::new_v4();
        self.events.emit(AuditEvent::system_event(
            "query_started",
            json!({ "query_length": query.question.chars().count() }),
        ));
        info!(%request_id, top_k = query.top_k, "processing query");

        let chunks = match self.retriever.search(&query.question, query.top_k).await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(%request_id, "retrieval failed: {}", e);
                let elapsed_ms = ticket.elapsed().as_millis() as u64;
                ticket.complete(false);
                let prefix: String = query.question.chars().take(ERROR_CONTEXT_CHARS).collect();
                self.events.emit(AuditEvent::error(
                    e.kind(),
                    e.to_string(),
                    format!("Query processing failed: {prefix}"),
                ));
                return QueryOutcome {
                    answer: PROCESSING_ERROR_ANSWER.to_string(),
                    confidence: 0.0,
                    sources: Vec::new(),
                    elapsed_ms,
                    context_preview: None,
                };
            }
        };

        if chunks.is_empty() {
            info!(%request_id, "no relevant documents found");
            let elapsed_ms = ticket.elapsed().as_millis() as u64;
            ticket.complete(false);
            self.events.emit(AuditEvent::query_processed(
                &query.question,
                elapsed_ms,
                0.0,
                0,
                false,
            ));
            return QueryOutcome {
                answer: NO_RESULTS_ANSWER.to_string(),
                confidence: 0.0,
                sources: Vec::new(),
                elapsed_ms,
                context_preview: None,
            };
        }

        let context = assemble_context(&chunks);

        let answer = match self.generator.generate(&query.question, &context).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(%request_id, "generation failed, using fallback: {}", e);
                self.events
                    .emit(AuditEvent::error(e.kind(), e.to_string(), "LLM processing"));
                fallback_answer(&query.question, &context)
            }
        };

        let confidence = score_confidence(&chunks, &query.question);
        let sources: Vec<_> = chunks.iter().map(|chunk| chunk.source.clone()).collect();
        let elapsed_ms = ticket.elapsed().as_millis() as u64;
        ticket.complete(true);
        self.events.emit(AuditEvent::query_processed(
            &query.question,
            elapsed_ms,
            confidence,
            sources.len(),
            true,
        ));
        info!(
            %request_id,
            confidence,
            elapsed_ms,
            sources = sources.len(),
            "query answered"
        );

        QueryOutcome {
            answer,
            confidence,
            sources,
            elapsed_ms,
            context_preview: Some(preview(&context, PREVIEW_CHARS)),
        }
    }
}
