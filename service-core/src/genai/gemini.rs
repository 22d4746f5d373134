//! Gemini AI provider implementation.
//!
//! Implements text generation using Google's Gemini REST API.
//! Supports both streaming (SSE) and non-streaming responses.

use super::{
    ChatTurn, FinishReason, ProviderError, ProviderResponse, ProviderStream, StreamChunk,
    TextProvider,
};
use crate::config::{GoogleConfig, ModelConfig};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Upper bound for a single Gemini call, streaming included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn from_settings(google: &GoogleConfig, models: &ModelConfig) -> Self {
        Self {
            api_key: google.api_key.clone(),
            model: models.text_model.clone(),
            api_base: google.api_base.clone(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Gemini text provider.
pub struct GeminiTextProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiTextProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Build the API URL for the configured model and method.
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model,
            method
        )
    }

    async fn post(
        &self,
        url: &str,
        request: &GenerateContentRequest,
    ) -> Result<Response, ProviderError> {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            if status.as_u16() == 400 {
                return Err(ProviderError::InvalidRequest(error_text));
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl TextProvider for GeminiTextProvider {
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError> {
        let request = GenerateContentRequest::new(&[], prompt);
        let url = self.api_url("generateContent");

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let api_response: GenerateContentResponse = self
            .post(&url, &request)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        let finish_reason = api_response
            .candidates
            .first()
            .map(|c| FinishReason::from_gemini(c.finish_reason.as_deref()))
            .unwrap_or(FinishReason::Complete);

        if finish_reason == FinishReason::ContentFilter {
            return Err(ProviderError::ContentFiltered);
        }

        let usage = api_response.usage_metadata.clone().unwrap_or_default();

        Ok(ProviderResponse {
            text: api_response.first_text(),
            input_tokens: usage.prompt_token_count.unwrap_or(0),
            output_tokens: usage.candidates_token_count.unwrap_or(0),
            finish_reason,
        })
    }

    async fn generate_stream(
        &self,
        history: &[ChatTurn],
        prompt: &str,
    ) -> Result<ProviderStream, ProviderError> {
        let request = GenerateContentRequest::new(history, prompt);
        let url = format!("{}?alt=sse", self.api_url("streamGenerateContent"));

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            history_len = history.len(),
            "Starting streaming request to Gemini API"
        );

        let response = self.post(&url, &request).await?;

        let (tx, rx) = mpsc::channel(32);

        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut decoder = SseDecoder::default();
            let mut input_tokens = 0i32;
            let mut output_tokens = 0i32;
            let mut last_finish_reason = FinishReason::Complete;

            while let Some(chunk_result) = stream.next().await {
                let chunk = match chunk_result {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::NetworkError(e.to_string())))
                            .await;
                        return;
                    }
                };

                for event in decoder.push(&chunk) {
                    if let Some(usage) = &event.usage_metadata {
                        input_tokens = usage.prompt_token_count.unwrap_or(input_tokens);
                        output_tokens = usage.candidates_token_count.unwrap_or(output_tokens);
                    }

                    if let Some(text) = event.joined_text() {
                        if tx.send(Ok(StreamChunk::Text(text))).await.is_err() {
                            // Receiver dropped; nobody is listening any more.
                            return;
                        }
                    }

                    if let Some(candidate) = event.candidates.first() {
                        if candidate.finish_reason.is_some() {
                            last_finish_reason =
                                FinishReason::from_gemini(candidate.finish_reason.as_deref());
                        }
                    }
                }
            }

            let _ = tx
                .send(Ok(StreamChunk::Complete {
                    input_tokens,
                    output_tokens,
                    finish_reason: last_finish_reason,
                }))
                .await;
        });

        Ok(Box::pin(ReceiverStream::new(rx)) as ProviderStream)
    }
}

/// Incremental decoder for `alt=sse` response bodies.
///
/// Bytes arrive in arbitrary chunks, possibly splitting a UTF-8 sequence, so
/// the buffer stays raw until a complete event has been framed.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    fn push(&mut self, chunk: &[u8]) -> Vec<GenerateContentResponse> {
        // JSON payloads never contain a raw CR, so dropping them normalizes CRLF framing.
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut events = Vec::new();
        while let Some(event_end) = find_event_end(&self.buffer) {
            let event: Vec<u8> = self.buffer.drain(..event_end + 2).collect();

            let event = match std::str::from_utf8(&event) {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping non UTF-8 Gemini SSE event");
                    continue;
                }
            };

            let data = event
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(str::trim_start)
                .collect::<Vec<_>>()
                .join("\n");

            if data.is_empty() {
                continue;
            }

            match serde_json::from_str::<GenerateContentResponse>(&data) {
                Ok(response) => events.push(response),
                Err(e) => tracing::warn!(error = %e, "Skipping undecodable Gemini SSE event"),
            }
        }

        events
    }
}

fn find_event_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|pair| pair == b"\n\n")
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

impl GenerateContentRequest {
    fn new(history: &[ChatTurn], prompt: &str) -> Self {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| Content::text(turn.role.as_str(), &turn.text))
            .collect();
        contents.push(Content::text("user", prompt));

        Self { contents }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

/// Only text parts are used; other part kinds deserialize with `text: None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// First candidate's first text part.
    fn first_text(&self) -> Option<String> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.first())
            .and_then(|part| part.text.clone())
    }

    /// All text parts of the first candidate, used for stream fragments.
    fn joined_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<i32>,
    candidates_token_count: Option<i32>,
}
