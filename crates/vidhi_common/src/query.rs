//! Query request and outcome types.

use serde::{Deserialize, Serialize};

/// Default number of chunks requested from the retriever.
pub const DEFAULT_TOP_K: usize = 3;

/// Smallest accepted top-k.
pub const MIN_TOP_K: usize = 1;

/// Largest accepted top-k.
pub const MAX_TOP_K: usize = 10;

/// Context preview length in characters.
pub const PREVIEW_CHARS: usize = 200;

/// A compliance question plus retrieval width.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub question: String,
    pub top_k: usize,
}

impl Query {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set the retrieval width, clamped to the accepted range.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.clamp(MIN_TOP_K, MAX_TOP_K);
        self
    }
}

/// Where a retrieved chunk came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub source: String,
    pub chunk_id: u32,
    #[serde(default = "default_document_type")]
    pub document_type: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_document_type() -> String {
    "general".to_string()
}

fn default_language() -> String {
    "english".to_string()
}

impl SourceRef {
    pub fn new(source: impl Into<String>, chunk_id: u32) -> Self {
        Self {
            source: source.into(),
            chunk_id,
            document_type: default_document_type(),
            language: default_language(),
        }
    }
}

/// One retrieval hit: chunk text plus provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub source: SourceRef,
}

impl RetrievedChunk {
    pub fn new(text: impl Into<String>, source: SourceRef) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}

/// Terminal result of one query. Success versus failure is a monitoring
/// concern and is not carried here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub answer: String,
    pub confidence: f64,
    pub sources: Vec<SourceRef>,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_preview: Option<String>,
}

/// First `max_chars` characters of `text`, with a trailing `...` when
/// anything was cut. Counts chars, never splits a code point.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    }
}
