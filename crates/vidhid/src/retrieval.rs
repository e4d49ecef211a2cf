//! Retrieval boundary: the search trait, an in-memory corpus, test fakes.
//!
//! Vector stores, embeddings, and chunking live outside this crate. The
//! in-memory retriever keeps the daemon runnable and the pipeline testable
//! against a real corpus of text files.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;
use walkdir::WalkDir;

use vidhi_common::{RetrievedChunk, SourceRef, VidhiError};

/// Finds the chunks most relevant to a question.
#[async_trait]
pub trait ChunkRetriever: Send + Sync {
    async fn search(&self, question: &str, k: usize) -> Result<Vec<RetrievedChunk>, VidhiError>;
}

/// Word-overlap retriever over an in-memory corpus.
pub struct MemoryRetriever {
    entries: Vec<RetrievedChunk>,
}

impl MemoryRetriever {
    pub fn new(entries: Vec<RetrievedChunk>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Load every `.txt` and `.md` file under `dir` as one corpus entry
    /// named after the file.
    pub fn from_dir(dir: &Path) -> Result<Self, VidhiError> {
        let mut entries: Vec<RetrievedChunk> = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| VidhiError::Retrieval(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let is_doc = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("txt") | Some("md")
            );
            if !is_doc {
                continue;
            }
            let text = std::fs::read_to_string(path)?;
            let source = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string();
            let chunk_id = entries.len() as u32;
            entries.push(RetrievedChunk::new(text, SourceRef::new(source, chunk_id)));
        }
        debug!(documents = entries.len(), "corpus loaded");
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ChunkRetriever for MemoryRetriever {
    async fn search(&self, question: &str, k: usize) -> Result<Vec<RetrievedChunk>, VidhiError> {
        let mut scored: Vec<(usize, &RetrievedChunk)> = self
            .entries
            .iter()
            .map(|entry| (overlap_score(question, &entry.text), entry))
            .filter(|(score, _)| *score > 0)
            .collect();
        // Stable sort keeps corpus order on ties.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, entry)| entry.clone())
            .collect())
    }
}

/// Distinct question words (lowercased, three letters or longer, punctuation
/// trimmed) found in the lowercased text.
fn overlap_score(question: &str, text: &str) -> usize {
    let text = text.to_lowercase();
    let mut seen: Vec<String> = Vec::new();
    for word in question.to_lowercase().split_whitespace() {
        let word = word.trim_matches(|c: char| !c.is_alphanumeric());
        if word.len() < 3 || seen.iter().any(|w| w == word) {
            continue;
        }
        seen.push(word.to_string());
    }
    seen.iter().filter(|word| text.contains(word.as_str())).count()
}

/// Canned retriever for tests: fixed chunks, an empty result, or a forced
/// fault. Records every `(question, k)` pair it is asked for.
pub struct FakeRetriever {
    chunks: Vec<RetrievedChunk>,
    fail_with: Option<String>,
    calls: Mutex<Vec<(String, usize)>>,
}

impl FakeRetriever {
    pub fn returning(chunks: Vec<RetrievedChunk>) -> Self {
        Self {
            chunks,
            fail_with: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::returning(Vec::new())
    }

    pub fn failing(message: &str) -> Self {
        Self {
            chunks: Vec::new(),
            fail_with: Some(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChunkRetriever for FakeRetriever {
    async fn search(&self, question: &str, k: usize) -> Result<Vec<RetrievedChunk>, VidhiError> {
        self.calls.lock().unwrap().push((question.to_string(), k));
        match &self.fail_with {
            Some(message) => Err(VidhiError::Retrieval(message.clone())),
            None => Ok(self.chunks.iter().take(k).cloned().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn corpus_entry(id: u32, text: &str) -> RetrievedChunk {
        RetrievedChunk::new(text, SourceRef::new(format!("doc{id}.txt"), id))
    }

    #[test]
    fn overlap_counts_distinct_trimmed_words() {
        assert_eq!(overlap_score("What is my penalty?", "Penalty applies here."), 1);
        assert_eq!(overlap_score("penalty penalty penalty", "penalty"), 1);
        assert_eq!(overlap_score("is it up", "is it up"), 0);
    }

    #[tokio::test]
    async fn search_ranks_by_overlap() {
        let retriever = MemoryRetriever::new(vec![
            corpus_entry(0, "Income tax slabs for individuals."),
            corpus_entry(1, "GST late filing penalty is 50 rupees per day."),
        ]);
        let hits = retriever
            .search("What is the penalty for late filing of GST?", 5)
            .await
            .unwrap();
        assert_eq!(hits[0].source.source, "doc1.txt");
    }

    #[tokio::test]
    async fn search_respects_k() {
        let retriever = MemoryRetriever::new(vec![
            corpus_entry(0, "gst one"),
            corpus_entry(1, "gst two"),
            corpus_entry(2, "gst three"),
        ]);
        let hits = retriever.search("gst details", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn search_without_overlap_is_empty() {
        let retriever = MemoryRetriever::new(vec![corpus_entry(0, "unrelated text")]);
        let hits = retriever.search("completely different", 3).await.unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn from_dir_loads_text_documents_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "GST basics").unwrap();
        fs::write(dir.path().join("b.md"), "Filing calendar").unwrap();
        fs::write(dir.path().join("c.bin"), [0u8, 1, 2]).unwrap();
        let retriever = MemoryRetriever::from_dir(dir.path()).unwrap();
        assert_eq!(retriever.len(), 2);
    }

    #[tokio::test]
    async fn fake_records_questions_and_k() {
        let fake = FakeRetriever::empty();
        fake.search("first", 3).await.unwrap();
        fake.search("second", 7).await.unwrap();
        assert_eq!(fake.calls(), vec![("first".to_string(), 3), ("second".to_string(), 7)]);
    }
}
