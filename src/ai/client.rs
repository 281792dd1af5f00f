//! LLM API client module
//!
//! Encapsulates all LLM API interactions for generating summaries.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{info, warn};

use super::prompt::{build_summary_prompt, estimate_tokens};
use super::{LlmProvider, Summarizer};
use crate::core::config::AppConfig;
use crate::errors::SummarizationError;

/// Total attempts per summary, including the first.
const MAX_ATTEMPTS: usize = 3;

/// LLM API client for generating summaries
pub struct LlmClient {
    http: Client,
    provider: LlmProvider,
    api_key: String,
    org_id: Option<String>,
    model_name: String,
    base_url: String,
    max_input_tokens: usize,
    retry_base_ms: u64,
}

impl LlmClient {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        provider: LlmProvider,
        api_key: String,
        model_name: String,
        timeout: Duration,
    ) -> Result<Self, SummarizationError> {
        let http = Client::builder().timeout(timeout).build().map_err(|e| {
            SummarizationError::Http(format!("Failed to build LLM HTTP client: {e}"))
        })?;

        Ok(Self {
            http,
            provider,
            api_key,
            org_id: None,
            model_name,
            base_url: provider.default_base_url().to_string(),
            max_input_tokens: crate::core::config::DEFAULT_MAX_INPUT_TOKENS,
            retry_base_ms: 200,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, SummarizationError> {
        Ok(Self::new(
            config.llm_provider,
            config.llm_api_key.clone(),
            config.llm_model.clone(),
            config.llm_timeout,
        )?
        .with_base_url(config.llm_base_url.clone())
        .with_org_id(config.llm_org_id.clone())
        .with_max_input_tokens(config.max_input_tokens))
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_org_id(mut self, org_id: Option<String>) -> Self {
        self.org_id = org_id;
        self
    }

    #[must_use]
    pub fn with_max_input_tokens(mut self, max_input_tokens: usize) -> Self {
        self.max_input_tokens = max_input_tokens;
        self
    }

    /// Base delay for the retry backoff.
    #[must_use]
    pub fn with_retry_base_ms(mut self, retry_base_ms: u64) -> Self {
        self.retry_base_ms = retry_base_ms;
        self
    }

    #[must_use]
    pub fn build_prompt(&self, document_text: &str) -> String {
        build_summary_prompt(document_text, self.max_input_tokens)
    }

    /// Send `prompt` to the configured provider, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns an error if every attempt fails or the response has no text.
    pub async fn generate_summary(&self, prompt: &str) -> Result<String, SummarizationError> {
        #[cfg(feature = "debug-logs")]
        info!("Using LLM prompt:\n{}", prompt);

        info!(
            provider = %self.provider,
            model = %self.model_name,
            "Generating summary, estimated input tokens: {}",
            estimate_tokens(prompt)
        );

        let strategy = ExponentialBackoff::from_millis(self.retry_base_ms.max(1))
            .map(jitter)
            .take(MAX_ATTEMPTS - 1);

        RetryIf::spawn(
            strategy,
            || self.request_once(prompt),
            |e: &SummarizationError| {
                let retry = e.is_transient();
                if retry {
                    warn!("Transient LLM failure, retrying: {}", e);
                }
                retry
            },
        )
        .await
    }

    async fn request_once(&self, prompt: &str) -> Result<String, SummarizationError> {
        let (url, body) = match self.provider {
            LlmProvider::Gemini => (
                format!(
                    "{}/v1beta/models/{}:generateContent",
                    self.base_url, self.model_name
                ),
                json!({
                    "contents": [
                        { "role": "user", "parts": [ { "text": prompt } ] }
                    ]
                }),
            ),
            LlmProvider::OpenAi => (
                format!("{}/v1/responses", self.base_url),
                json!({
                    "model": self.model_name,
                    "input": [ { "role": "user", "content": prompt } ]
                }),
            ),
        };

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| SummarizationError::Http(format!("LLM API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(SummarizationError::Upstream {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let response_json: Value = response.json().await.map_err(|e| {
            SummarizationError::Http(format!("Failed to parse LLM response: {e}"))
        })?;

        let text_opt = match self.provider {
            LlmProvider::Gemini => gemini_output_text(&response_json),
            LlmProvider::OpenAi => openai_output_text(&response_json),
        };

        text_opt
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(SummarizationError::EmptyResponse)
    }

    fn headers(&self) -> Result<HeaderMap, SummarizationError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match self.provider {
            LlmProvider::Gemini => {
                let key_value = self.api_key.parse().map_err(|e| {
                    SummarizationError::InvalidHeader(format!("x-goog-api-key: {e}"))
                })?;
                headers.insert("x-goog-api-key", key_value);
            }
            LlmProvider::OpenAi => {
                let auth_value = format!("Bearer {}", self.api_key).parse().map_err(|e| {
                    SummarizationError::InvalidHeader(format!("Authorization: {e}"))
                })?;
                headers.insert("Authorization", auth_value);

                if let Some(org) = &self.org_id {
                    let org_value = org.parse().map_err(|e| {
                        SummarizationError::InvalidHeader(format!("OpenAI-Organization: {e}"))
                    })?;
                    headers.insert("OpenAI-Organization", org_value);
                }
            }
        }

        Ok(headers)
    }
}

#[async_trait]
impl Summarizer for LlmClient {
    async fn summarize(&self, text: &str) -> Result<String, SummarizationError> {
        let prompt = self.build_prompt(text);
        self.generate_summary(&prompt).await
    }
}

/// Joins the text parts of the first Gemini candidate.
#[must_use]
pub fn gemini_output_text(response_json: &Value) -> Option<String> {
    let parts = response_json
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())?;

    let collected: Vec<&str> = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    if collected.is_empty() {
        None
    } else {
        Some(collected.concat())
    }
}

/// Reads `output_text`, falling back to the `output_text` items of `output`.
#[must_use]
pub fn openai_output_text(response_json: &Value) -> Option<String> {
    response_json
        .get("output_text")
        .and_then(|v| v.as_str())
        .map(std::string::ToString::to_string)
        .or_else(|| {
            let mut collected: Vec<String> = Vec::new();
            if let Some(items) = response_json.get("output").and_then(|o| o.as_array()) {
                for item in items {
                    if let Some(parts) = item.get("content").and_then(|c| c.as_array()) {
                        for p in parts {
                            let is_output_text = p
                                .get("type")
                                .and_then(|t| t.as_str())
                                .is_some_and(|t| t == "output_text");
                            if !is_output_text {
                                continue;
                            }
                            if let Some(s) = p.get("text").and_then(|t| t.as_str()) {
                                collected.push(s.to_string());
                            } else if let Some(s) = p
                                .get("text")
                                .and_then(|t| t.get("value"))
                                .and_then(|v| v.as_str())
                            {
                                collected.push(s.to_string());
                            }
                        }
                    }
                }
            }
            if collected.is_empty() {
                None
            } else {
                Some(collected.join("\n"))
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemini_text_joins_candidate_parts() {
        let v = json!({
            "candidates": [
                { "content": { "parts": [ { "text": "Key points: " }, { "text": "a, b" } ] } },
                { "content": { "parts": [ { "text": "ignored" } ] } }
            ]
        });
        assert_eq!(gemini_output_text(&v).as_deref(), Some("Key points: a, b"));
    }

    #[test]
    fn gemini_text_missing_candidates() {
        assert!(gemini_output_text(&json!({ "promptFeedback": {} })).is_none());
    }

    #[test]
    fn openai_text_prefers_output_text() {
        let v = json!({ "output_text": "short", "output": [] });
        assert_eq!(openai_output_text(&v).as_deref(), Some("short"));
    }

    #[test]
    fn openai_text_collects_typed_output_items() {
        let v = json!({
            "output": [
                { "type": "reasoning", "content": [ { "type": "reasoning_text", "text": "hidden" } ] },
                { "type": "message", "content": [
                    { "type": "output_text", "text": "first" },
                    { "type": "output_text", "text": { "value": "second" } }
                ] }
            ]
        });
        assert_eq!(openai_output_text(&v).as_deref(), Some("first\nsecond"));
    }
}
