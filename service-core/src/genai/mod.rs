//! Generative-model provider abstractions.
//!
//! Handlers only see [`TextProvider`]: a one-shot `generate` and a streaming
//! `generate_stream` that replays prior turns. The Gemini candidate/content/parts
//! shape stays inside [`gemini`].

pub mod gemini;
pub mod mock;
pub mod session;

pub use session::ChatSession;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::time::Instant;
use thiserror::Error;
use tokio_stream::Stream;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::InvalidRequest(_) => "invalid_request",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::NetworkError(_) => "network_error",
        }
    }
}

/// Result of a one-shot generation.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// First candidate's first text part; `None` when the model returned no candidates.
    pub text: Option<String>,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,

    /// Finish reason.
    pub finish_reason: FinishReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
    Error,
}

impl FinishReason {
    pub(crate) fn from_gemini(reason: Option<&str>) -> Self {
        match reason {
            Some("STOP") | None => FinishReason::Complete,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("PROHIBITED_CONTENT") | Some("BLOCKLIST") => {
                FinishReason::ContentFilter
            }
            Some("OTHER") => FinishReason::Error,
            Some(_) => FinishReason::Complete,
        }
    }
}

/// Stream chunk for streaming responses.
#[derive(Debug, Clone)]
pub enum StreamChunk {
    /// Text fragment, in generation order.
    Text(String),

    /// Final completion with usage stats.
    Complete {
        input_tokens: i32,
        output_tokens: i32,
        finish_reason: FinishReason,
    },
}

/// Type alias for provider streams.
pub type ProviderStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, ProviderError>> + Send>>;

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One entry of a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Trait for text generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// One-shot, history-free generation.
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse, ProviderError>;

    /// Streaming generation continuing `history` with a new user `prompt`.
    async fn generate_stream(
        &self,
        history: &[ChatTurn],
        prompt: &str,
    ) -> Result<ProviderStream, ProviderError>;
}

/// Records the outcome and latency of one upstream call.
///
/// `operation` is a fixed label such as `chat`, `summarize` or `answer`.
pub fn record_provider_call<T>(
    operation: &'static str,
    started: Instant,
    result: &Result<T, ProviderError>,
) {
    let outcome = match result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };

    metrics::counter!(
        "genai_requests_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("genai_provider_latency_seconds", "operation" => operation)
        .record(started.elapsed().as_secs_f64());
}
