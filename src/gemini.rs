//! Gemini API client for structured strategy generation
//!
//! Sends the prompt together with a response schema and asks for JSON back.
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::config::Config;
use crate::error::TransportError;
use crate::provider::GenerativeModel;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const JSON_MIME_TYPE: &str = "application/json";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: Option<f32>,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_endpoint(api_key, DEFAULT_BASE_URL.to_string(), DEFAULT_MODEL.to_string())
    }

    pub fn with_endpoint(api_key: String, base_url: String, model: String) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            temperature: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut client = Self::with_endpoint(
            config.api_key.clone(),
            config.base_url.clone(),
            config.model.clone(),
        )?;
        client.temperature = config.temperature;
        Ok(client)
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME_TYPE,
                response_schema: schema,
                temperature: self.temperature,
            },
        };

        info!(model = %self.model, "Calling Gemini API");

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!("Gemini API request failed: {}", e);
                TransportError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Gemini API error response: {}", body);
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            let e = e.without_url();
            error!("Failed to decode Gemini envelope: {}", e);
            TransportError::Http(e)
        })?;

        Ok(extract_text(&gemini_response))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Concatenate the text parts of the first candidate.
///
/// Returns an empty string when the provider produced nothing usable.
fn extract_text(response: &GeminiResponse) -> String {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        warn!(block_reason = reason, "Gemini blocked the prompt");
    }

    let Some(candidate) = response.candidates.first() else {
        return String::new();
    };

    match candidate.finish_reason.as_deref() {
        Some("STOP") | None => {}
        Some(reason) => warn!(finish_reason = reason, "Gemini finished early"),
    }

    if let Some(usage) = &response.usage_metadata {
        info!(
            prompt_tokens = usage.prompt_token_count,
            output_tokens = usage.candidates_token_count,
            "Gemini response received"
        );
    }

    candidate
        .content
        .as_ref()
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<Content>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: i64,
    #[serde(default)]
    candidates_token_count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
