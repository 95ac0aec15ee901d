//! Chat-completion client for the extraction service.
//!
//! One request per company record: batched multi-company calls produced
//! noticeably more malformed JSON, so throughput is traded for parse
//! reliability. Transport failures are retried here; an unparseable
//! response is not an error, it just produces no document.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::prompts;
use crate::models::{ExtractedDocument, SourceRecord};

/// Delay base between retry attempts.
const RETRY_DELAY_MS: u64 = 500;

/// Maximum characters of a rejected payload kept in the log.
const LOGGED_PAYLOAD_CHARS: usize = 500;

/// Configuration for the extraction client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Whether extraction is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// API endpoint base (default: https://api.openai.com).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Bearer token for the API.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model to use for extraction.
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens in the response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature; extraction wants determinism.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Attempts per record for transport-level failures.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_enabled() -> bool {
    true
}
fn default_endpoint() -> String {
    "https://api.openai.com".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_temperature() -> f32 {
    0.0
}
fn default_max_attempts() -> u32 {
    3
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_attempts: default_max_attempts(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Chat API request format.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat API response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
    error: Option<ChatApiError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatApiError {
    message: String,
}

/// Errors from the extraction transport.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("extraction is disabled")]
    Disabled,
    #[error("connection error: {0}")]
    Connection(String),
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
}

impl ExtractionError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Disabled => false,
        }
    }
}

/// Extraction client issuing one structured-completion call per record.
pub struct ExtractionClient {
    config: ExtractionConfig,
    client: reqwest::Client,
}

impl ExtractionClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ExtractionConfig) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExtractionError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Request a structured document for one candidate record.
    ///
    /// Returns `Ok(None)` when the model's output cannot be parsed as a
    /// document; the raw payload is logged truncated. On success the
    /// document's corporate number is overwritten with the input record's
    /// identifier: the key must stay invariant and the model's own
    /// rendering of it is never trusted.
    pub async fn extract(
        &self,
        record: &SourceRecord,
    ) -> Result<Option<ExtractedDocument>, ExtractionError> {
        if !self.config.enabled {
            return Err(ExtractionError::Disabled);
        }

        let prompt = prompts::build_extraction_prompt(record);
        debug!(identifier = %record.identifier, "requesting extraction");
        let raw = self.call_chat(&prompt).await?;

        let mut doc = match decode_payload(&raw) {
            Some(doc) => doc,
            None => {
                warn!(
                    identifier = %record.identifier,
                    payload = %truncate_chars(&raw, LOGGED_PAYLOAD_CHARS),
                    "discarding unparseable extraction payload"
                );
                return Ok(None);
            }
        };

        doc.identity.corporate_number = record.identifier.clone();
        Ok(Some(doc))
    }

    /// Call the chat endpoint, retrying transient failures.
    async fn call_chat(&self, prompt: &str) -> Result<String, ExtractionError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompts::SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!("{}/v1/chat/completions", self.config.endpoint);
        let mut last_error = ExtractionError::Connection("no attempts made".to_string());

        for attempt in 1..=self.config.max_attempts.max(1) {
            if attempt > 1 {
                tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64)).await;
            }

            match self.send_once(&url, &request).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_retryable() => {
                    debug!(attempt, error = %e, "extraction attempt failed");
                    last_error = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error)
    }

    async fn send_once(&self, url: &str, request: &ChatRequest) -> Result<String, ExtractionError> {
        let mut builder = self.client.post(url).json(request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| ExtractionError::Connection(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                message: truncate_chars(&body, LOGGED_PAYLOAD_CHARS),
            });
        }

        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| ExtractionError::Connection(e.to_string()))?;

        if let Some(error) = chat.error {
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                message: error.message,
            });
        }

        chat.choices
            .and_then(|mut c| {
                if c.is_empty() {
                    None
                } else {
                    Some(c.remove(0).message.content)
                }
            })
            .ok_or_else(|| ExtractionError::Api {
                status: status.as_u16(),
                message: "response contained no choices".to_string(),
            })
    }
}

/// Parse a raw model response into a document, tolerating code fences.
fn decode_payload(raw: &str) -> Option<ExtractedDocument> {
    let body = strip_code_fence(raw);
    serde_json::from_str(body).ok()
}

/// Remove an optional markdown code fence wrapping the payload.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (e.g. "json") on the opening fence line.
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };

    rest.trim_end().trim_end_matches("```").trim()
}

/// Truncate to a character limit for logging (UTF-8 safe).
fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.chars().take(max_chars).collect()
}
