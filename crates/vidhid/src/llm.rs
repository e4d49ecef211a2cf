//! Answer generation boundary and the Ollama adapter.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use vidhi_common::VidhiError;

use crate::config::LlmConfig;
use crate::prompts::render_query_prompt;

/// Produces an answer for a question over assembled context.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, question: &str, context: &str) -> Result<String, VidhiError>;
}

/// Adapter for Ollama's `/api/generate` endpoint.
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(config: &LlmConfig) -> Result<Self, VidhiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VidhiError::Config(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl AnswerGenerator for OllamaGenerator {
    async fn generate(&self, question: &str, context: &str) -> Result<String, VidhiError> {
        let prompt = render_query_prompt(context, question);
        let url = format!("{}/api/generate", self.base_url);
        debug!(model = %self.model, prompt_bytes = prompt.len(), "requesting generation");

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
            }))
            .send()
            .await
            .map_err(|e| VidhiError::Generation(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VidhiError::Generation(format!(
                "ollama returned status {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| VidhiError::Generation(e.to_string()))?;
        body["response"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| VidhiError::Generation("missing response field".to_string()))
    }
}

/// Canned generator for tests: a fixed reply or a forced fault. Records the
/// `(question, context)` pairs it was asked to answer.
pub struct FakeGenerator {
    reply: String,
    fail_with: Option<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail_with: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: String::new(),
            fail_with: Some(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AnswerGenerator for FakeGenerator {
    async fn generate(&self, question: &str, context: &str) -> Result<String, VidhiError> {
        self.calls
            .lock()
            .unwrap()
            .push((question.to_string(), context.to_string()));
        match &self.fail_with {
            Some(message) => Err(VidhiError::Generation(message.clone())),
            None => Ok(self.reply.clone()),
        }
    }
}
