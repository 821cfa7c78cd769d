//! Generative model seam
//!
//! The provider is an opaque function from (prompt, schema) to text.
//! `GeminiClient` is the production implementation; `ScriptedModel` keeps
//! the rest of the system testable without network access.

use crate::error::GenerationError;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Trait for structured text generation (LLM controlled)
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Submit a prompt constrained by `schema` and return the raw text.
    /// An empty string means the provider produced no text.
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<String>;

    /// Model identifier, for logs
    fn model_name(&self) -> &str;
}

/// Scripted model for development & testing
///
/// Replays queued outcomes in order and records every prompt it receives.
/// An exhausted script answers with an empty response.
#[derive(Default)]
pub struct ScriptedModel {
    outcomes: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful text payload
    pub fn respond_with(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queue a failure
    pub fn fail_with(self, error: GenerationError) -> Self {
        self.push(Err(error));
        self
    }

    /// Wait this long before answering each request
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    fn push(&self, outcome: Result<String>) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push_back(outcome);
        }
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, prompt: &str, _schema: &Value) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self
            .outcomes
            .lock()
            .ok()
            .and_then(|mut outcomes| outcomes.pop_front());

        next.unwrap_or_else(|| Ok(String::new()))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
